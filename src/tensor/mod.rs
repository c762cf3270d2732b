/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 张量（Tensor）模块：图引擎执行期使用的稠密f32多维数组。
 *                 本模块只提供层前向计算所需的最小算子集合，
 *                 更复杂的数值内核不在本库的职责范围内。
 */

use ndarray::{Array, IxDyn};
use rand::rngs::StdRng;
use rand::Rng;

mod ops {
    pub mod add;
    pub mod div;
    pub mod eq;
    pub mod mat_mul;
    pub mod mul;
    pub mod others;
    pub mod sub;
}

mod property;
mod shape;

#[cfg(test)]
pub mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：除了`data`长度为1且shape为`[]`的情况（标量），`data`的长度必须和`shape`中所有元素的乘积相等。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).unwrap();
        Tensor { data }
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个全一张量
    pub fn ones(shape: &[usize]) -> Tensor {
        Tensor {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 创建一个随机张量，其值在[min, max)的区间内（使用全局RNG）
    pub fn new_random(min: f32, max: f32, shape: &[usize]) -> Tensor {
        let mut rng = rand::thread_rng();
        Self::random_impl(min, max, shape, &mut rng)
    }

    /// 创建一个随机张量，其值在[min, max)的区间内（使用指定RNG，保证可重复性）
    pub fn new_random_with_rng(min: f32, max: f32, shape: &[usize], rng: &mut StdRng) -> Tensor {
        Self::random_impl(min, max, shape, rng)
    }

    /// 创建一个服从正态分布的随机张量（使用全局RNG）。
    /// 正态采样使用Box-Muller变换，不依赖额外的分布crate。
    pub fn new_normal(mean: f32, std_dev: f32, shape: &[usize]) -> Tensor {
        let mut rng = rand::thread_rng();
        Self::normal_impl(mean, std_dev, shape, &mut rng)
    }

    /// 创建一个服从正态分布的随机张量（使用指定RNG，保证可重复性）
    pub fn new_normal_with_rng(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut StdRng,
    ) -> Tensor {
        Self::normal_impl(mean, std_dev, shape, rng)
    }
}

// 私有方法
impl Tensor {
    fn random_impl<R: Rng>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let data = (0..shape.iter().product::<usize>())
            .map(|_| rng.gen_range(min..max))
            .collect::<Vec<_>>();
        Tensor::new(&data, shape)
    }

    fn normal_impl<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        // Box-Muller：每轮产出2个相互独立的正态样本
        while data.len() < data_len {
            let u1: f32 = rng.gen_range(0.0..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, shape)
    }

    /// NumPy风格广播兼容性：从右向左对齐，每个维度须相等或其中一个为1
    pub(crate) fn can_broadcast_with(&self, other: &Tensor) -> bool {
        let shape_1 = self.shape();
        let shape_2 = other.shape();
        shape_1
            .iter()
            .rev()
            .zip(shape_2.iter().rev())
            .all(|(&d1, &d2)| d1 == d2 || d1 == 1 || d2 == 1)
    }
}
