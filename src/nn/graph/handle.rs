/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::{DType, SymbolicTensor};
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 符号图句柄（Keras 函数式风格用户 API）
///
/// # 设计原则
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 各层的用户级句柄（Dense、Conv2D……）自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    /// 创建新图
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new())),
        }
    }

    /// 创建带种子的图（用于确定性的权重初始化与dropout）
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::new_with_seed(seed))),
        }
    }

    /// 创建带名称的图
    pub fn with_name(name: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::with_name(name))),
        }
    }

    /// 创建带名称和种子的图
    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(GraphInner::with_name_and_seed(name, seed))),
        }
    }

    /// 从现有 GraphInner 创建句柄
    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// 获取内部 GraphInner 的不可变引用
    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    /// 获取内部 GraphInner 的可变引用
    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    // ==================== 创建输入 ====================

    /// 声明一路float32输入，返回其占位符号张量
    ///
    /// # 示例
    /// ```ignore
    /// let x = graph.input(&DynamicShape::with_dynamic_batch(&[784]), Some("x"))?;
    /// ```
    pub fn input(
        &self,
        shape: &DynamicShape,
        name: Option<&str>,
    ) -> Result<SymbolicTensor, GraphError> {
        self.input_with_dtype(shape, DType::Float32, name)
    }

    /// 声明一路指定数据类型的输入
    pub fn input_with_dtype(
        &self,
        shape: &DynamicShape,
        dtype: DType,
        name: Option<&str>,
    ) -> Result<SymbolicTensor, GraphError> {
        self.inner.borrow_mut().new_input(shape, dtype, name)
    }

    // ==================== 杂项 ====================

    pub fn name(&self) -> String {
        self.inner.borrow().name().to_string()
    }

    /// 设置/重置图的随机种子
    pub fn set_seed(&self, seed: u64) {
        self.inner.borrow_mut().set_seed(seed);
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Graph")
            .field("name", &inner.name())
            .field("layers", &inner.layers_count())
            .field("nodes", &inner.nodes_count())
            .finish()
    }
}
