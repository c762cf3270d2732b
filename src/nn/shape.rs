/*
 * DynamicShape: 支持动态维度的形状系统
 *
 * 类似 Keras/TensorFlow 的 (None, 128) 设计，允许某些维度在搭建图时未知。
 * 例如 batch 维度通常是动态的，因为搭建和执行时可能使用不同的 batch_size。
 *
 * # 示例
 * ```
 * use only_keras::nn::DynamicShape;
 *
 * // 固定形状
 * let fixed = DynamicShape::fixed(&[32, 128]);
 * assert_eq!(fixed.to_string(), "[32, 128]");
 *
 * // 动态 batch
 * let dynamic_batch = DynamicShape::with_dynamic_batch(&[128]);
 * assert_eq!(dynamic_batch.to_string(), "[?, 128]");
 *
 * // 完全自定义
 * let custom = DynamicShape::new(&[None, Some(10), None, Some(64)]);
 * assert_eq!(custom.to_string(), "[?, 10, ?, 64]");
 * ```
 */

use std::fmt;

/// 维度值：Some(n) 表示固定值 n，None 表示动态（任意值）
pub type Dim = Option<usize>;

/// 动态形状：支持动态维度的形状表示
///
/// 与 `Vec<usize>` 的区别：
/// - `Vec<usize>`: 所有维度必须是确定的数值
/// - `DynamicShape`: 某些维度可以是 None，表示"任意值"
///
/// # 使用场景
/// - batch 维度：搭建图时未知，执行时 256 或 1，用 None 表示
/// - 符号张量的形状推断与输入校验
/// - 摘要/描述符：None 显示为 `?`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DynamicShape {
    dims: Vec<Dim>,
}

impl DynamicShape {
    /// 创建一个动态形状
    ///
    /// # 示例
    /// ```
    /// use only_keras::nn::DynamicShape;
    ///
    /// let shape = DynamicShape::new(&[None, Some(128)]);
    /// assert_eq!(shape.ndim(), 2);
    /// assert!(shape.is_dynamic(0));
    /// assert!(!shape.is_dynamic(1));
    /// ```
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// 从固定形状创建（所有维度都是确定的）
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Some(d)).collect(),
        }
    }

    /// 创建一个动态 batch 的形状
    ///
    /// 第一维是 None（动态），其余维度固定。
    ///
    /// # 示例
    /// ```
    /// use only_keras::nn::DynamicShape;
    ///
    /// let shape = DynamicShape::with_dynamic_batch(&[128, 64]);
    /// assert_eq!(shape.to_string(), "[?, 128, 64]");
    /// ```
    pub fn with_dynamic_batch(feature_dims: &[usize]) -> Self {
        let mut dims = vec![None];
        dims.extend(feature_dims.iter().map(|&d| Some(d)));
        Self { dims }
    }

    /// 从实际张量形状创建固定形状
    pub fn from_tensor_shape(shape: &[usize]) -> Self {
        Self::fixed(shape)
    }

    /// 获取维度数量
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// 获取指定维度的值
    ///
    /// 返回 Some(n) 如果维度固定，None 如果维度动态
    pub fn dim(&self, index: usize) -> Dim {
        self.dims.get(index).copied().flatten()
    }

    /// 检查指定维度是否是动态的
    pub fn is_dynamic(&self, index: usize) -> bool {
        self.dims.get(index).map(|d| d.is_none()).unwrap_or(false)
    }

    /// 检查是否有任何动态维度
    pub fn has_dynamic_dims(&self) -> bool {
        self.dims.iter().any(|d| d.is_none())
    }

    /// 获取所有维度
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// 两个形状是否兼容：维度数相同，且对应维度相等或其中一方为动态
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.ndim() == other.ndim()
            && self
                .dims
                .iter()
                .zip(other.dims.iter())
                .all(|(d1, d2)| match (d1, d2) {
                    (Some(a), Some(b)) => a == b,
                    _ => true,
                })
    }

    /// 实际张量形状是否满足本（符号）形状
    pub fn matches_tensor(&self, shape: &[usize]) -> bool {
        self.ndim() == shape.len()
            && self
                .dims
                .iter()
                .zip(shape.iter())
                .all(|(d, &s)| d.map_or(true, |v| v == s))
    }

    /// 合并两个兼容的形状：动态维度被另一方的固定值细化。
    /// 不兼容时返回 None。
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.is_compatible_with(other) {
            return None;
        }
        let dims = self
            .dims
            .iter()
            .zip(other.dims.iter())
            .map(|(d1, d2)| d1.or(*d2))
            .collect::<Vec<_>>();
        Some(Self { dims })
    }
}

impl fmt::Display for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .dims
            .iter()
            .map(|d| d.map_or("?".to_string(), |v| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "[{}]", rendered)
    }
}
