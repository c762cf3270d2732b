/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 负责符号式层/计算图（layers graph）的构建与执行
 */

mod container;
mod descriptor;
mod graph;
mod init;
pub mod layer;
mod node;
mod sequential;
mod shape;
mod symbolic;

pub use container::Container;
pub use descriptor::{
    GraphDescriptor, LayerDescriptor, LayerTypeDescriptor, TensorSlotDescriptor,
};
pub use graph::{Graph, GraphError, GraphInner};
pub use init::Init;
pub use layer::{
    Activation, ActivationFn, Add, Concatenate, Conv2D, Dense, Dropout, Flatten, LayerId,
    MaxPool2D, Padding, Reshape,
};
pub use node::{InboundRef, Node, NodeId};
pub use sequential::Sequential;
pub use shape::{Dim, DynamicShape};
pub use symbolic::{DType, SymbolicTensor, TensorId};

#[cfg(test)]
mod tests;
