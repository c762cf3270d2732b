/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : MaxPool2D（二维最大池化）层，NHWC布局。
 *                 same填充等价于用负无穷填充，这里通过跳过越界窗口位置实现。
 */

use super::conv2d::{conv_out_dim, conv_out_dim_concrete, pad_before, Padding};
use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;

pub(in crate::nn) struct MaxPool2DKind {
    pool_size: (usize, usize),
    strides: (usize, usize),
    padding: Padding,
}

impl MaxPool2DKind {
    pub fn new(pool_size: (usize, usize), strides: (usize, usize), padding: Padding) -> Self {
        Self {
            pool_size,
            strides,
            padding,
        }
    }
}

impl TraitLayer for MaxPool2DKind {
    fn type_name(&self) -> &'static str {
        "max_pool2d"
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec {
            arity: Some(1),
            ndim: Some(4),
            ..InputSpec::default()
        }
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        let input_shape = &input_shapes[0];
        let out_h = conv_out_dim(
            input_shape.dim(1),
            self.pool_size.0,
            self.strides.0,
            self.padding,
        )?;
        let out_w = conv_out_dim(
            input_shape.dim(2),
            self.pool_size.1,
            self.strides.1,
            self.padding,
        )?;
        Ok(vec![DynamicShape::new(&[
            input_shape.dims()[0],
            out_h,
            out_w,
            input_shape.dims()[3],
        ])])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let input = inputs[0];
        let shape = input.shape();
        let (batch, in_h, in_w, channels) = (shape[0], shape[1], shape[2], shape[3]);
        let (pool_h, pool_w) = self.pool_size;
        let (stride_h, stride_w) = self.strides;

        let out_h = conv_out_dim_concrete(in_h, pool_h, stride_h, self.padding)?;
        let out_w = conv_out_dim_concrete(in_w, pool_w, stride_w, self.padding)?;
        let (pad_h, pad_w) = match self.padding {
            Padding::Valid => (0, 0),
            Padding::Same => (
                pad_before(in_h, out_h, pool_h, stride_h),
                pad_before(in_w, out_w, pool_w, stride_w),
            ),
        };

        let input_view = input
            .view()
            .into_dimensionality::<ndarray::Ix4>()
            .map_err(|_| {
                GraphError::ComputationError("MaxPool2D层的输入必须是4阶张量".to_string())
            })?;

        let mut data = Vec::with_capacity(batch * out_h * out_w * channels);
        for b in 0..batch {
            for oh in 0..out_h {
                for ow in 0..out_w {
                    for c in 0..channels {
                        let mut max_val = f32::NEG_INFINITY;
                        for i in 0..pool_h {
                            let Some(h) = (oh * stride_h + i).checked_sub(pad_h) else {
                                continue;
                            };
                            if h >= in_h {
                                continue;
                            }
                            for j in 0..pool_w {
                                let Some(w) = (ow * stride_w + j).checked_sub(pad_w) else {
                                    continue;
                                };
                                if w >= in_w {
                                    continue;
                                }
                                max_val = max_val.max(input_view[[b, h, w, c]]);
                            }
                        }
                        data.push(max_val);
                    }
                }
            }
        }

        Ok(vec![Tensor::new(&data, &[batch, out_h, out_w, channels])])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::MaxPool2D {
            pool_size: self.pool_size,
            strides: self.strides,
            padding: self.padding,
        }
    }
}

/// MaxPool2D 层（用户级句柄）
///
/// # 使用示例
/// ```ignore
/// let pool = MaxPool2D::new(&graph, (2, 2), (2, 2), Padding::Valid, None)?;
/// let y = pool.apply(&x)?;
/// ```
#[derive(Debug)]
pub struct MaxPool2D {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl MaxPool2D {
    pub fn new(
        graph: &Graph,
        pool_size: (usize, usize),
        strides: (usize, usize),
        padding: Padding,
        name: Option<&str>,
    ) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(
            LayerKind::MaxPool2D(MaxPool2DKind::new(pool_size, strides, padding)),
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
