/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 未归类的张量运算：逐元素映射、求和、末轴softmax。
 */

use crate::tensor::Tensor;
use ndarray::{Axis, IxDyn};

impl Tensor {
    /// 对张量中的每个元素应用函数`f`，返回一个新的张量。
    pub fn map<F>(&self, f: F) -> Tensor
    where
        F: Fn(f32) -> f32,
    {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    /// 返回张量所有元素之和（标量张量）。
    pub fn sum(&self) -> Tensor {
        Tensor::new(&[self.data.sum()], &[1])
    }

    /// 沿最后一个轴做softmax，返回与原张量同形状的新张量。
    /// 每行先减去该行最大值再做指数归一化，以保证数值稳定。
    pub fn softmax_last_axis(&self) -> Tensor {
        let shape = self.shape().to_vec();
        let last = *shape.last().expect("softmax不支持0阶张量");
        let rows: usize = shape.iter().rev().skip(1).product();

        let flat = self
            .data
            .clone()
            .into_shape(IxDyn(&[rows.max(1), last]))
            .unwrap();
        let mut result = flat.clone();
        for (mut out_row, in_row) in result.outer_iter_mut().zip(flat.axis_iter(Axis(0))) {
            let max = in_row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let mut denom = 0.0;
            for (o, &x) in out_row.iter_mut().zip(in_row.iter()) {
                let e = (x - max).exp();
                *o = e;
                denom += e;
            }
            for o in out_row.iter_mut() {
                *o /= denom;
            }
        }

        Tensor {
            data: result.into_shape(IxDyn(&shape)).unwrap(),
        }
    }
}
