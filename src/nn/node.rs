/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 节点（Node）：记录层的一次应用。
 *                 每次把层作用到一组符号张量上，都会产生一个Node，
 *                 它把输出层与各输入张量的来源层双向连接起来。
 */

use super::layer::LayerId;
use super::symbolic::SymbolicTensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// 输入张量的来源：哪个层的第几次应用的第几个输出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundRef {
    pub layer: LayerId,
    pub node_index: usize,
    pub tensor_index: usize,
}

/// 层的一次应用。
/// Input层的源节点没有输入（`inbound`与`input_tensors`为空），只有一个输出。
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    outbound_layer: LayerId,
    /// 本节点在`outbound_layer.inbound_nodes`中的序号
    node_index: usize,
    inbound: Vec<InboundRef>,
    input_tensors: Vec<SymbolicTensor>,
    output_tensors: Vec<SymbolicTensor>,
}

impl Node {
    pub(in crate::nn) fn new(
        id: NodeId,
        outbound_layer: LayerId,
        node_index: usize,
        inbound: Vec<InboundRef>,
        input_tensors: Vec<SymbolicTensor>,
        output_tensors: Vec<SymbolicTensor>,
    ) -> Self {
        Self {
            id,
            outbound_layer,
            node_index,
            inbound,
            input_tensors,
            output_tensors,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 产出本节点输出的层
    pub fn outbound_layer(&self) -> LayerId {
        self.outbound_layer
    }

    pub fn node_index(&self) -> usize {
        self.node_index
    }

    pub fn inbound(&self) -> &[InboundRef] {
        &self.inbound
    }

    pub fn input_tensors(&self) -> &[SymbolicTensor] {
        &self.input_tensors
    }

    pub fn output_tensors(&self) -> &[SymbolicTensor] {
        &self.output_tensors
    }

    /// 是否为源节点（Input层产生的、没有任何输入的节点）
    pub fn is_origin(&self) -> bool {
        self.input_tensors.is_empty()
    }
}
