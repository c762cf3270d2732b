/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 张量的形状变换：reshape、沿轴拼接等。
 */

use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Axis, IxDyn};

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let total_elements: usize = self.data.len();
        let new_total_elements: usize = shape.iter().product();
        assert!(
            total_elements == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        Self {
            data: self.data.clone().into_shape(IxDyn(shape)).unwrap(),
        }
    }

    /// 保留首维（batch），将其余维度展平成一维。
    /// 如[2, 3, 4] -> [2, 12]；一维张量会被展成[n, 1]。
    pub fn flatten_batch(&self) -> Self {
        let shape = self.shape();
        let batch = shape.first().copied().unwrap_or(1);
        let rest: usize = shape.iter().skip(1).product();
        self.reshape(&[batch, rest])
    }

    /// 将多个张量沿指定轴拼接起来，返回一个新的张量。
    /// * `tensors` - 待拼接的张量列表，至少1个；
    /// * `axis` - 拼接轴，必须小于各张量的阶数；
    ///
    /// 所有张量除拼接轴外的其余维度必须一致，否则报错。
    pub fn concat(tensors: &[&Tensor], axis: usize) -> Result<Tensor, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis >= first.dimension() {
            return Err(TensorError::ConcatAxisOutOfRange {
                axis,
                dimension: first.dimension(),
            });
        }
        for tensor in tensors.iter().skip(1) {
            let compatible = tensor.dimension() == first.dimension()
                && tensor
                    .shape()
                    .iter()
                    .zip(first.shape())
                    .enumerate()
                    .all(|(i, (&d1, &d2))| i == axis || d1 == d2);
            if !compatible {
                return Err(TensorError::ConcatShapeMismatch {
                    axis,
                    shape1: first.shape().to_vec(),
                    shape2: tensor.shape().to_vec(),
                });
            }
        }

        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views)
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Tensor { data })
    }
}
