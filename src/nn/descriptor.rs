/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 图描述符（Graph Descriptor）
 *                 统一的中间表示（IR），用于序列化、模型重建和调试输出
 */

use super::layer::{ActivationFn, Padding};
use super::shape::Dim;
use super::symbolic::DType;
use serde::{Deserialize, Serialize};

/// 图（容器）的可序列化描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 容器名称
    pub name: String,
    /// 所有层描述（按容器的层顺序）
    pub layers: Vec<LayerDescriptor>,
    /// 容器输入：引用某层的某次应用的某个输出
    pub input_layers: Vec<TensorSlotDescriptor>,
    /// 容器输出
    pub output_layers: Vec<TensorSlotDescriptor>,
    /// 参数文件路径（相对于 JSON 文件），仅在保存完整模型时使用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

/// 张量槽位：层名 + 应用序号 + 输出序号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSlotDescriptor {
    pub layer: String,
    pub node_index: usize,
    pub tensor_index: usize,
}

/// 层描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// 层名称（容器内唯一）
    pub name: String,
    /// 层类型及其配置
    pub layer_type: LayerTypeDescriptor,
    /// 层的每次应用的输入槽位列表（Input层为空）
    pub inbound_nodes: Vec<Vec<TensorSlotDescriptor>>,
    /// 参数数量（无参数层省略）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_count: Option<usize>,
}

/// 层类型描述（包含类型特定参数）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerTypeDescriptor {
    Input {
        shape: Vec<Dim>,
        dtype: DType,
    },
    Dense {
        units: usize,
        activation: ActivationFn,
        use_bias: bool,
    },
    Activation {
        activation: ActivationFn,
    },
    Flatten,
    Reshape {
        target_shape: Vec<usize>,
    },
    Dropout {
        rate: f32,
    },
    Conv2D {
        filters: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
        activation: ActivationFn,
        use_bias: bool,
    },
    MaxPool2D {
        pool_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
    },
    Add,
    Concatenate {
        axis: isize,
    },
}

impl GraphDescriptor {
    /// 创建新的图描述符
    pub fn new(name: &str) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            layers: Vec::new(),
            input_layers: Vec::new(),
            output_layers: Vec::new(),
            params_file: None,
        }
    }

    /// 添加层描述
    pub fn add_layer(&mut self, layer: LayerDescriptor) {
        self.layers.push(layer);
    }

    /// 获取总参数量
    pub fn total_params(&self) -> usize {
        self.layers.iter().filter_map(|l| l.param_count).sum()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
