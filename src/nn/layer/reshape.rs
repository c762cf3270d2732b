/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Reshape 层：保留batch维，把其余维度重排成目标形状。
 *                 目标形状不含batch维，且必须是全部确定的数值（不支持-1通配）。
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;

pub(in crate::nn) struct ReshapeKind {
    target_shape: Vec<usize>,
}

impl ReshapeKind {
    pub fn new(target_shape: Vec<usize>) -> Self {
        Self { target_shape }
    }
}

impl TraitLayer for ReshapeKind {
    fn type_name(&self) -> &'static str {
        "reshape"
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
        // 非batch维全部已知时校验元素总量守恒；含动态维则推迟到执行期
        let known: Option<usize> = input_shape
            .dims()
            .iter()
            .skip(1)
            .try_fold(1usize, |acc, d| d.map(|v| acc * v));
        let target: usize = self.target_shape.iter().product();
        if let Some(known) = known {
            if known != target {
                return Err(GraphError::InvalidOperation(format!(
                    "Reshape层无法把{}个元素重排成{:?}（共{}个元素）",
                    known, self.target_shape, target
                )));
            }
        }

        let mut dims = vec![input_shape.dims()[0]];
        dims.extend(self.target_shape.iter().map(|&d| Some(d)));
        Ok(vec![DynamicShape::new(&dims)])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let input = inputs[0];
        let batch = input.shape()[0];
        let rest: usize = input.shape().iter().skip(1).product();
        let target: usize = self.target_shape.iter().product();
        if rest != target {
            return Err(GraphError::ComputationError(format!(
                "Reshape层执行时元素总量不符：输入{:?}无法重排成batch + {:?}",
                input.shape(),
                self.target_shape
            )));
        }

        let mut out_shape = vec![batch];
        out_shape.extend_from_slice(&self.target_shape);
        Ok(vec![input.reshape(&out_shape)])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Reshape {
            target_shape: self.target_shape.clone(),
        }
    }
}

/// Reshape 层（用户级句柄）
///
/// # 使用示例
/// ```ignore
/// // [batch, 784] -> [batch, 28, 28, 1]
/// let reshape = Reshape::new(&graph, &[28, 28, 1], None)?;
/// let y = reshape.apply(&x)?;
/// ```
#[derive(Debug)]
pub struct Reshape {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Reshape {
    pub fn new(graph: &Graph, target_shape: &[usize], name: Option<&str>) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(
            LayerKind::Reshape(ReshapeKind::new(target_shape.to_vec())),
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
