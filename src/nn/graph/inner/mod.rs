/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : GraphInner：符号图工作区的底层实现。
 *                 统一持有所有层实例与节点，负责id分配、层命名与RNG。
 */

mod apply;
mod core;

use crate::nn::layer::{LayerHandle, LayerId};
use crate::nn::node::{Node, NodeId};
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;

/// 层/节点/张量的id全进程唯一（而非图内唯一），
/// 这样别的图的符号张量不可能冒充本图的。
pub(in crate::nn) static NEXT_LAYER_ID: AtomicU64 = AtomicU64::new(0);
pub(in crate::nn) static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);
pub(in crate::nn) static NEXT_TENSOR_ID: AtomicU64 = AtomicU64::new(0);

pub struct GraphInner {
    name: String,
    layers: HashMap<LayerId, LayerHandle>,
    nodes: HashMap<NodeId, Node>,
    /// 按层类型名计数，用于自动命名（dense_1、dense_2……）
    type_name_counters: HashMap<&'static str, usize>,
    /// 固定种子的RNG（权重初始化与dropout共用），None时使用全局RNG
    rng: Option<StdRng>,
}
