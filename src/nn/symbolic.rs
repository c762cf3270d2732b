/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 符号张量（SymbolicTensor）：层应用产出的占位符。
 *                 它不持有任何数据，只记录形状、数据类型与来源
 *                 （哪个层的第几次应用的第几个输出）。
 */

use super::layer::LayerId;
use super::shape::DynamicShape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 符号张量的数据类型。执行期张量目前只支持f32，
/// 其余类型仅作为元数据随图传播。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    #[default]
    Float32,
    Int32,
    Bool,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float32 => "float32",
            Self::Int32 => "int32",
            Self::Bool => "bool",
        };
        write!(f, "{}", name)
    }
}

/// 符号张量在图内的唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorId(pub u64);

/// 符号张量：层调用图中流动的占位值
///
/// 克隆开销很低（只有元数据），同一id的两个克隆指代同一个占位。
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicTensor {
    id: TensorId,
    name: String,
    dtype: DType,
    shape: DynamicShape,
    source_layer: LayerId,
    node_index: usize,
    tensor_index: usize,
}

impl SymbolicTensor {
    pub(in crate::nn) fn new(
        id: TensorId,
        name: &str,
        dtype: DType,
        shape: DynamicShape,
        source_layer: LayerId,
        node_index: usize,
        tensor_index: usize,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            dtype,
            shape,
            source_layer,
            node_index,
            tensor_index,
        }
    }

    pub fn id(&self) -> TensorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &DynamicShape {
        &self.shape
    }

    /// 产出本张量的层
    pub fn source_layer(&self) -> LayerId {
        self.source_layer
    }

    /// 该层的第几次应用（节点序号）
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// 该次应用的第几个输出
    pub fn tensor_index(&self) -> usize {
        self.tensor_index
    }
}

impl fmt::Display for SymbolicTensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.dtype, self.shape)
    }
}
