/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : Graph 模块的错误类型
 */

use crate::nn::layer::LayerId;
use crate::nn::node::NodeId;
use thiserror::Error;

/// 图/层操作错误类型
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("图中不存在id为{0:?}的层")]
    LayerNotFound(LayerId),
    #[error("图中不存在id为{0:?}的节点")]
    NodeNotFound(NodeId),
    #[error("张量{0}不属于本图（或其来源记录已失效）")]
    TensorNotFound(String),
    #[error("{0}")]
    DuplicateLayerName(String),
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{0}")]
    ComputationError(String),
    #[error("形状不匹配：预期{expected}，实际{got}。{message}")]
    ShapeMismatch {
        expected: String,
        got: String,
        message: String,
    },
    #[error("维度（阶数）不匹配：预期{expected}，实际{got}。{message}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        message: String,
    },
    #[error("检测到环：张量{tensor}（层{layer}）位于一个环中")]
    CycleDetected { tensor: String, layer: String },
    #[error("图不连通：无法获得张量{tensor}在层{layer}处的值")]
    GraphDisconnected { tensor: String, layer: String },
}
