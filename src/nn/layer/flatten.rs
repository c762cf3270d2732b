/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Flatten 层：保留batch维，把其余维度展平成一维。
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;

pub(in crate::nn) struct FlattenKind;

impl FlattenKind {
    pub fn new() -> Self {
        Self
    }
}

impl TraitLayer for FlattenKind {
    fn type_name(&self) -> &'static str {
        "flatten"
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec {
            arity: Some(1),
            min_ndim: Some(2),
            ..InputSpec::default()
        }
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        let input_shape = &input_shapes[0];
        // 非batch维中只要有一个动态，展平后的维度就是动态的
        let rest = input_shape
            .dims()
            .iter()
            .skip(1)
            .try_fold(1usize, |acc, d| d.map(|v| acc * v));
        Ok(vec![DynamicShape::new(&[input_shape.dims()[0], rest])])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![inputs[0].flatten_batch()])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Flatten
    }
}

/// Flatten 层（用户级句柄）
#[derive(Debug)]
pub struct Flatten {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Flatten {
    pub fn new(graph: &Graph, name: Option<&str>) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(LayerKind::Flatten(FlattenKind::new()), name)?;
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
