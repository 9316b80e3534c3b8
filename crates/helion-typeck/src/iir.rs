//! The intermediate representation inference runs over.
//!
//! A [`Func`] owns a flat arena of [`Value`]s (constants, arguments, globals
//! and instructions) and a list of [`Block`]s listing instruction ids in
//! order. Every value carries a structural type, initially a fresh variable
//! for anything that is not a literal. [`FuncBuilder`] creates those variables
//! in the [`InferCtx`] that will later solve them.

use std::fmt;

use crate::ty::Ty;
use crate::unify::InferCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// A stack slot. Its type is the type of what is stored in it.
    Alloc,
    Store {
        dst: ValueId,
        src: ValueId,
    },
    Load {
        src: ValueId,
    },
    Ret(ValueId),
    Binary {
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Call {
        callee: ValueId,
        args: Vec<ValueId>,
    },
    Br {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },
    Jmp(BlockId),
}

impl InstKind {
    pub fn is_terminator(&self) -> bool {
        matches!(self, InstKind::Ret(_) | InstKind::Br { .. } | InstKind::Jmp(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    ConstInt(i64),
    ConstFloat(f64),
    /// The n-th function argument.
    Arg(u32),
    /// A reference to another function by name.
    Global(String),
    Inst(InstKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub ty: Ty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub insts: Vec<ValueId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub values: Vec<Value>,
    pub blocks: Vec<Block>,
    pub args: Vec<ValueId>,
    pub ret: Ty,
}

impl Func {
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    /// The curried function type `a0 -> a1 -> ... -> ret`.
    pub fn fn_type(&self) -> Ty {
        let params = self.args.iter().map(|a| self.value(*a).ty.clone()).collect();
        Ty::curried(params, self.ret.clone())
    }
}

/// Builds a [`Func`] block by block, appending to the current block.
pub struct FuncBuilder<'a> {
    ctx: &'a mut InferCtx,
    func: Func,
    current: BlockId,
}

impl<'a> FuncBuilder<'a> {
    /// Start a function with an empty entry block and a fresh return type.
    pub fn new(ctx: &'a mut InferCtx, name: impl Into<String>) -> Self {
        let ret = ctx.fresh_var();
        FuncBuilder {
            ctx,
            func: Func {
                name: name.into(),
                values: Vec::new(),
                blocks: vec![Block {
                    id: BlockId(0),
                    insts: Vec::new(),
                }],
                args: Vec::new(),
                ret,
            },
            current: BlockId(0),
        }
    }

    fn push(&mut self, kind: ValueKind, ty: Ty) -> ValueId {
        let id = ValueId(self.func.values.len() as u32);
        self.func.values.push(Value { kind, ty });
        id
    }

    fn push_inst(&mut self, kind: InstKind) -> ValueId {
        let ty = match kind {
            InstKind::Br { .. } | InstKind::Jmp(_) => Ty::unit(),
            _ => self.ctx.fresh_var(),
        };
        let id = self.push(ValueKind::Inst(kind), ty);
        self.func.blocks[self.current.0 as usize].insts.push(id);
        id
    }

    pub fn arg(&mut self) -> ValueId {
        let index = self.func.args.len() as u32;
        let ty = self.ctx.fresh_var();
        let id = self.push(ValueKind::Arg(index), ty);
        self.func.args.push(id);
        id
    }

    pub fn const_int(&mut self, value: i64) -> ValueId {
        self.push(ValueKind::ConstInt(value), Ty::int())
    }

    pub fn const_float(&mut self, value: f64) -> ValueId {
        self.push(ValueKind::ConstFloat(value), Ty::float())
    }

    pub fn global(&mut self, name: impl Into<String>) -> ValueId {
        let ty = self.ctx.fresh_var();
        self.push(ValueKind::Global(name.into()), ty)
    }

    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.func.blocks.len() as u32);
        self.func.blocks.push(Block {
            id,
            insts: Vec::new(),
        });
        id
    }

    pub fn position_at(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn alloc(&mut self) -> ValueId {
        self.push_inst(InstKind::Alloc)
    }

    pub fn store(&mut self, dst: ValueId, src: ValueId) -> ValueId {
        self.push_inst(InstKind::Store { dst, src })
    }

    pub fn load(&mut self, src: ValueId) -> ValueId {
        self.push_inst(InstKind::Load { src })
    }

    pub fn ret(&mut self, value: ValueId) -> ValueId {
        self.push_inst(InstKind::Ret(value))
    }

    pub fn binary(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        self.push_inst(InstKind::Binary { op, lhs, rhs })
    }

    pub fn call(&mut self, callee: ValueId, args: Vec<ValueId>) -> ValueId {
        self.push_inst(InstKind::Call { callee, args })
    }

    pub fn br(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) -> ValueId {
        self.push_inst(InstKind::Br {
            cond,
            then_block,
            else_block,
        })
    }

    pub fn jmp(&mut self, target: BlockId) -> ValueId {
        self.push_inst(InstKind::Jmp(target))
    }

    pub fn finish(self) -> Func {
        self.func
    }
}
