/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Dense (全连接) 层：output = x @ W + b，再接可选激活。
 *
 * # 输入/输出形状
 * - 输入：[..., in_features]（至少2阶，作用于最后一维）
 * - 输出：[..., units]
 *
 * 权重在首次应用时按输入的最后一维构建：
 * - kernel: [in_features, units]，Kaiming 初始化
 * - bias:   [units]，零初始化（可选）
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::init::Init;
use crate::nn::layer::ActivationFn;
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use rand::rngs::StdRng;

pub(in crate::nn) struct DenseKind {
    units: usize,
    activation: ActivationFn,
    use_bias: bool,
    /// 构建后记录的输入特征维度
    in_features: Option<usize>,
    kernel: Option<Tensor>,
    bias: Option<Tensor>,
}

impl DenseKind {
    pub fn new(units: usize, activation: ActivationFn, use_bias: bool) -> Self {
        Self {
            units,
            activation,
            use_bias,
            in_features: None,
            kernel: None,
            bias: None,
        }
    }

    fn kernel(&self) -> Result<&Tensor, GraphError> {
        self.kernel
            .as_ref()
            .ok_or_else(|| GraphError::InvalidOperation("Dense层尚未构建".to_string()))
    }
}

impl TraitLayer for DenseKind {
    fn type_name(&self) -> &'static str {
        "dense"
    }

    fn input_spec(&self) -> InputSpec {
        let axes = match self.in_features {
            // 构建后锁定最后一维，防止共享层被不兼容的输入复用
            Some(in_features) => vec![(-1, in_features)],
            None => Vec::new(),
        };
        InputSpec {
            arity: Some(1),
            min_ndim: Some(2),
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
        let in_features = input_shape.dim(input_shape.ndim() - 1).ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "Dense层要求输入的最后一维是已知的，实际形状为{}",
                input_shape
            ))
        })?;

        self.kernel = Some(Init::Kaiming.generate_with(&[in_features, self.units], rng));
        if self.use_bias {
            self.bias = Some(Init::Zeros.generate(&[self.units]));
        }
        self.in_features = Some(in_features);
        Ok(())
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        let input_shape = &input_shapes[0];
        let mut dims = input_shape.dims().to_vec();
        match dims.last_mut() {
            Some(last) => *last = Some(self.units),
            None => {
                return Err(GraphError::InvalidOperation(
                    "Dense层的输入不能是0阶张量".to_string(),
                ))
            }
        }
        Ok(vec![DynamicShape::new(&dims)])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let input = inputs[0];
        let kernel = self.kernel()?;

        // 高于2阶时先压成矩阵，乘完再还原形状
        let input_shape = input.shape().to_vec();
        let Some((&in_features, batch_dims)) = input_shape.split_last() else {
            return Err(GraphError::ComputationError(
                "Dense层的输入不能是0阶张量".to_string(),
            ));
        };
        let rows: usize = batch_dims.iter().product();
        let flat = if input.dimension() == 2 {
            input.clone()
        } else {
            input.reshape(&[rows, in_features])
        };

        let mut output = flat.mat_mul(kernel);
        if let Some(bias) = &self.bias {
            output = &output + bias;
        }
        if input_shape.len() > 2 {
            let mut out_shape = batch_dims.to_vec();
            out_shape.push(self.units);
            output = output.reshape(&out_shape);
        }
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
                    "Dense层没有名为{}的权重",
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
                message: format!("覆写Dense层权重{}时形状不符", weight_name),
            }),
            None => Err(GraphError::InvalidOperation(
                "Dense层尚未构建，无法覆写权重".to_string(),
            )),
        }
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Dense {
            units: self.units,
            activation: self.activation,
            use_bias: self.use_bias,
        }
    }
}

/// Dense 层（用户级句柄）
///
/// # 使用示例
/// ```ignore
/// let fc = Dense::new(&graph, 128, ActivationFn::Relu, true, Some("fc1"))?;
/// let h = fc.apply(&x)?;
/// ```
#[derive(Debug)]
pub struct Dense {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Dense {
    /// 创建新的 Dense 层
    ///
    /// # 参数
    /// - `graph`: 计算图句柄
    /// - `units`: 输出特征维度
    /// - `activation`: 内联激活（不需要时传`ActivationFn::Linear`）
    /// - `use_bias`: 是否使用偏置
    /// - `name`: 层名称；None 时自动生成（dense_1、dense_2……）
    pub fn new(
        graph: &Graph,
        units: usize,
        activation: ActivationFn,
        use_bias: bool,
        name: Option<&str>,
    ) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(
            LayerKind::Dense(DenseKind::new(units, activation, use_bias)),
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

    /// 把层作用到一个符号张量上，返回输出符号张量。
    /// 同一个层可以被多次应用（共享层），每次应用产生一个新节点。
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
