/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Dropout 层。
 *                 训练模式：以概率rate置零，幸存元素按1/(1-rate)放大（inverted dropout）。
 *                 推理模式：恒等。
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use rand::Rng;

pub(in crate::nn) struct DropoutKind {
    rate: f32,
}

impl DropoutKind {
    pub fn new(rate: f32) -> Result<Self, GraphError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(GraphError::InvalidOperation(format!(
                "Dropout率必须在[0, 1)区间内，实际为{}",
                rate
            )));
        }
        Ok(Self { rate })
    }

    fn mask_with<R: Rng>(&self, input: &Tensor, rng: &mut R) -> Tensor {
        let scale = 1.0 / (1.0 - self.rate);
        let data = input
            .data_as_slice()
            .iter()
            .map(|&x| {
                if rng.gen_range(0.0..1.0f32) < self.rate {
                    0.0
                } else {
                    x * scale
                }
            })
            .collect::<Vec<_>>();
        Tensor::new(&data, input.shape())
    }
}

impl TraitLayer for DropoutKind {
    fn type_name(&self) -> &'static str {
        "dropout"
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec {
            arity: Some(1),
            ..InputSpec::default()
        }
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        Ok(vec![input_shapes[0].clone()])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let input = inputs[0];
        if !ctx.training || self.rate == 0.0 {
            return Ok(vec![input.clone()]);
        }
        let output = match ctx.rng.as_deref_mut() {
            Some(rng) => self.mask_with(input, rng),
            None => self.mask_with(input, &mut rand::thread_rng()),
        };
        Ok(vec![output])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Dropout { rate: self.rate }
    }
}

/// Dropout 层（用户级句柄）
#[derive(Debug)]
pub struct Dropout {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Dropout {
    pub fn new(graph: &Graph, rate: f32, name: Option<&str>) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(LayerKind::Dropout(DropoutKind::new(rate)?), name)?;
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
