/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Conv2D（二维卷积）层，NHWC布局：[batch, 高, 宽, 通道]。
 *                 这里只做朴素的直接卷积，追求正确与可读，不做任何加速。
 *
 * # 输入/输出形状
 * - 输入：[batch, h, w, in_channels]
 * - 输出：[batch, out_h, out_w, filters]
 *
 * 权重：
 * - kernel: [kernel_h, kernel_w, in_channels, filters]，Kaiming 初始化
 * - bias:   [filters]，零初始化（可选）
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::init::Init;
use crate::nn::layer::ActivationFn;
use crate::nn::shape::{Dim, DynamicShape};
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// 空间填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// 不填充，窗口只在有效区域内滑动
    #[default]
    Valid,
    /// 填充到输出尺寸为 ceil(input / stride)
    Same,
}

/// 单个空间维度的输出尺寸（动态维度原样传播）
pub(in crate::nn) fn conv_out_dim(
    input: Dim,
    window: usize,
    stride: usize,
    padding: Padding,
) -> Result<Dim, GraphError> {
    input
        .map(|i| conv_out_dim_concrete(i, window, stride, padding))
        .transpose()
}

/// 单个空间维度的输出尺寸（输入已知）
pub(in crate::nn) fn conv_out_dim_concrete(
    input: usize,
    window: usize,
    stride: usize,
    padding: Padding,
) -> Result<usize, GraphError> {
    match padding {
        Padding::Valid => {
            if input < window {
                return Err(GraphError::InvalidOperation(format!(
                    "valid填充下输入尺寸{}小于窗口尺寸{}",
                    input, window
                )));
            }
            Ok((input - window) / stride + 1)
        }
        Padding::Same => Ok((input + stride - 1) / stride),
    }
}

/// same填充时某一维在起始侧的填充量
pub(in crate::nn) fn pad_before(input: usize, out: usize, window: usize, stride: usize) -> usize {
    let total = ((out - 1) * stride + window).saturating_sub(input);
    total / 2
}

pub(in crate::nn) struct Conv2DKind {
    filters: usize,
    kernel_size: (usize, usize),
    strides: (usize, usize),
    padding: Padding,
    activation: ActivationFn,
    use_bias: bool,
    in_channels: Option<usize>,
    kernel: Option<Tensor>,
    bias: Option<Tensor>,
}

impl Conv2DKind {
    pub fn new(
        filters: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
        activation: ActivationFn,
        use_bias: bool,
    ) -> Self {
        Self {
            filters,
            kernel_size,
            strides,
            padding,
            activation,
            use_bias,
            in_channels: None,
            kernel: None,
            bias: None,
        }
    }
}

impl TraitLayer for Conv2DKind {
    fn type_name(&self) -> &'static str {
        "conv2d"
    }

    fn input_spec(&self) -> InputSpec {
        let axes = match self.in_channels {
            Some(in_channels) => vec![(-1, in_channels)],
            None => Vec::new(),
        };
        InputSpec {
            arity: Some(1),
            ndim: Some(4),
            axes,
            ..InputSpec::default()
        }
    }

    fn build(
        &mut self,
        input_shapes: &[DynamicShape],
        rng: Option<&mut StdRng>,
    ) -> Result<(), GraphError> {
        let input_shape = &input_shapes[0];
        let in_channels = input_shape.dim(3).ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "Conv2D层要求输入的通道维是已知的，实际形状为{}",
                input_shape
            ))
        })?;

        let (kernel_h, kernel_w) = self.kernel_size;
        self.kernel = Some(Init::Kaiming.generate_with(
            &[kernel_h, kernel_w, in_channels, self.filters],
            rng,
        ));
        if self.use_bias {
            self.bias = Some(Init::Zeros.generate(&[self.filters]));
        }
        self.in_channels = Some(in_channels);
        Ok(())
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        let input_shape = &input_shapes[0];
        let out_h = conv_out_dim(
            input_shape.dim(1),
            self.kernel_size.0,
            self.strides.0,
            self.padding,
        )?;
        let out_w = conv_out_dim(
            input_shape.dim(2),
            self.kernel_size.1,
            self.strides.1,
            self.padding,
        )?;
        Ok(vec![DynamicShape::new(&[
            input_shape.dims()[0],
            out_h,
            out_w,
            Some(self.filters),
        ])])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let input = inputs[0];
        let kernel = self
            .kernel
            .as_ref()
            .ok_or_else(|| GraphError::InvalidOperation("Conv2D层尚未构建".to_string()))?;

        let shape = input.shape();
        let (batch, in_h, in_w, in_c) = (shape[0], shape[1], shape[2], shape[3]);
        let (kernel_h, kernel_w) = self.kernel_size;
        let (stride_h, stride_w) = self.strides;

        let out_h = conv_out_dim_concrete(in_h, kernel_h, stride_h, self.padding)?;
        let out_w = conv_out_dim_concrete(in_w, kernel_w, stride_w, self.padding)?;
        let (pad_h, pad_w) = match self.padding {
            Padding::Valid => (0, 0),
            Padding::Same => (
                pad_before(in_h, out_h, kernel_h, stride_h),
                pad_before(in_w, out_w, kernel_w, stride_w),
            ),
        };

        let input_view = input
            .view()
            .into_dimensionality::<ndarray::Ix4>()
            .map_err(|_| GraphError::ComputationError("Conv2D层的输入必须是4阶张量".to_string()))?;
        let kernel_view = kernel.view().into_dimensionality::<ndarray::Ix4>().unwrap();
        let bias = self.bias.as_ref().map(|b| b.data_as_slice().to_vec());

        // 朴素直接卷积：按[batch, out_h, out_w, filters]的行优先顺序逐点累加
        let mut data = Vec::with_capacity(batch * out_h * out_w * self.filters);
        for b in 0..batch {
            for oh in 0..out_h {
                for ow in 0..out_w {
                    for f in 0..self.filters {
                        let mut acc = 0.0f32;
                        for i in 0..kernel_h {
                            // 越界的窗口位置视为零填充，直接跳过
                            let Some(h) = (oh * stride_h + i).checked_sub(pad_h) else {
                                continue;
                            };
                            if h >= in_h {
                                continue;
                            }
                            for j in 0..kernel_w {
                                let Some(w) = (ow * stride_w + j).checked_sub(pad_w) else {
                                    continue;
                                };
                                if w >= in_w {
                                    continue;
                                }
                                for c in 0..in_c {
                                    acc += input_view[[b, h, w, c]] * kernel_view[[i, j, c, f]];
                                }
                            }
                        }
                        if let Some(bias) = &bias {
                            acc += bias[f];
                        }
                        data.push(acc);
                    }
                }
            }
        }

        let output = Tensor::new(&data, &[batch, out_h, out_w, self.filters]);
        Ok(vec![self.activation.apply(&output)])
    }

    fn weights(&self) -> Vec<(&'static str, &Tensor)> {
        let mut weights = Vec::new();
        if let Some(kernel) = &self.kernel {
            weights.push(("kernel", kernel));
        }
        if let Some(bias) = &self.bias {
            weights.push(("bias", bias));
        }
        weights
    }

    fn set_weight(&mut self, weight_name: &str, value: &Tensor) -> Result<(), GraphError> {
        let slot = match weight_name {
            "kernel" => &mut self.kernel,
            "bias" if self.use_bias => &mut self.bias,
            _ => {
                return Err(GraphError::InvalidOperation(format!(
                    "Conv2D层没有名为{}的权重",
                    weight_name
                )))
            }
        };
        match slot {
            Some(current) if current.shape() == value.shape() => {
                *slot = Some(value.clone());
                Ok(())
            }
            Some(current) => Err(GraphError::ShapeMismatch {
                expected: format!("{:?}", current.shape()),
                got: format!("{:?}", value.shape()),
                message: format!("覆写Conv2D层权重{}时形状不符", weight_name),
            }),
            None => Err(GraphError::InvalidOperation(
                "Conv2D层尚未构建，无法覆写权重".to_string(),
            )),
        }
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Conv2D {
            filters: self.filters,
            kernel_size: self.kernel_size,
            strides: self.strides,
            padding: self.padding,
            activation: self.activation,
            use_bias: self.use_bias,
        }
    }
}

/// Conv2D 层（用户级句柄）
///
/// # 使用示例
/// ```ignore
/// let conv = Conv2D::new(&graph, 32, (3, 3), (1, 1), Padding::Same, ActivationFn::Relu, true, None)?;
/// let y = conv.apply(&x)?;
/// ```
#[derive(Debug)]
pub struct Conv2D {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Conv2D {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: &Graph,
        filters: usize,
        kernel_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
        activation: ActivationFn,
        use_bias: bool,
        name: Option<&str>,
    ) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(
            LayerKind::Conv2D(Conv2DKind::new(
                filters,
                kernel_size,
                strides,
                padding,
                activation,
                use_bias,
            )),
            name,
        )?;
        let name = inner.get_layer(id)?.name().to_string();
        drop(inner);
        Ok(Self {
            id,
            name,
            graph: graph.clone(),
        })
    }

    pub fn apply(&self, input: &SymbolicTensor) -> Result<SymbolicTensor, GraphError> {
        let mut outputs = self
            .graph
            .inner_mut()
            .apply_layer(self.id, std::slice::from_ref(input))?;
        Ok(outputs.remove(0))
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
