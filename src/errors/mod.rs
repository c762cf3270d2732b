use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("矩阵乘法只接受2阶张量，实际得到{0}阶")]
    MatMulNeed2dTensor(usize),
    #[error("矩阵乘法要求前一个张量的列数等于后一个张量的行数：{0:?}与{1:?}")]
    MatMulShapeMismatch(Vec<usize>, Vec<usize>),

    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("拼接轴{axis}超出了张量的阶数{dimension}")]
    ConcatAxisOutOfRange { axis: usize, dimension: usize },
    #[error("沿轴{axis}拼接时，除该轴外的其余维度必须一致：{shape1:?}与{shape2:?}")]
    ConcatShapeMismatch {
        axis: usize,
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },
}
