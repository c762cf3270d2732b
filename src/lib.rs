//! # Only Keras
//!
//! `only_keras`项目旨在用纯rust仿造[keras](https://keras.io)的函数式（Functional）API：
//! 层（Layer）作用于符号张量（SymbolicTensor）上，逐步搭建出一张由层调用（Node）组成的
//! 有向无环图（DAG），随后可对整图做连通性校验、形状推断、前向执行、摘要打印与（反）序列化。
//!
//! 本库不做自动微分与训练循环，只专注于“符号图引擎”本身。

pub mod errors;
pub mod nn;
pub mod tensor;
pub mod utils;
