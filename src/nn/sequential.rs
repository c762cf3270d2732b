/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Sequential：线性堆叠模型的便捷外壳。
 *                 攒一串单输入单输出的层，build时统一接线并固化成Container。
 */

use super::container::Container;
use super::graph::{Graph, GraphError};
use super::layer::LayerId;
use super::shape::DynamicShape;
use crate::tensor::Tensor;

/// Sequential 模型
///
/// # 使用示例
/// ```ignore
/// let mut model = Sequential::new(Some("mnist"));
/// let graph = model.graph().clone();
/// model.push(Flatten::new(&graph, None)?.id())?;
/// model.push(Dense::new(&graph, 128, ActivationFn::Relu, true, None)?.id())?;
/// model.push(Dense::new(&graph, 10, ActivationFn::Softmax, true, None)?.id())?;
/// model.build(&DynamicShape::with_dynamic_batch(&[28, 28]))?;
/// let y = model.call(&[x])?;
/// ```
#[derive(Debug)]
pub struct Sequential {
    graph: Graph,
    name: String,
    layer_ids: Vec<LayerId>,
    container: Option<Container>,
}

impl Sequential {
    pub fn new(name: Option<&str>) -> Self {
        let name = name.unwrap_or("sequential").to_string();
        Self {
            graph: Graph::with_name(&name),
            name,
            layer_ids: Vec::new(),
            container: None,
        }
    }

    /// 创建带种子的Sequential（确保权重初始化可重复）
    pub fn new_with_seed(name: Option<&str>, seed: u64) -> Self {
        let name = name.unwrap_or("sequential").to_string();
        Self {
            graph: Graph::with_name_and_seed(&name, seed),
            name,
            layer_ids: Vec::new(),
            container: None,
        }
    }

    /// 模型内部的符号图。新层必须创建在这张图上。
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// 追加一层（按追加顺序依次接线）
    pub fn push(&mut self, layer_id: LayerId) -> Result<&mut Self, GraphError> {
        if self.container.is_some() {
            return Err(GraphError::InvalidOperation(
                "Sequential已构建，不能再追加层".to_string(),
            ));
        }
        // 提前校验层确实在本图上
        self.graph.inner().get_layer(layer_id)?;
        self.layer_ids.push(layer_id);
        Ok(self)
    }

    /// 按给定输入形状把所有层接成一条链，并固化成Container
    pub fn build(&mut self, input_shape: &DynamicShape) -> Result<(), GraphError> {
        if self.container.is_some() {
            return Err(GraphError::InvalidOperation(
                "Sequential已构建过".to_string(),
            ));
        }
        if self.layer_ids.is_empty() {
            return Err(GraphError::InvalidOperation(
                "Sequential至少需要1层".to_string(),
            ));
        }

        let input = self.graph.input(input_shape, None)?;
        let mut current = input.clone();
        for &layer_id in &self.layer_ids {
            let mut outputs = self
                .graph
                .inner_mut()
                .apply_layer(layer_id, std::slice::from_ref(&current))?;
            if outputs.len() != 1 {
                return Err(GraphError::InvalidOperation(
                    "Sequential只支持单输出层".to_string(),
                ));
            }
            current = outputs.remove(0);
        }

        self.container = Some(Container::from_io(
            &self.graph,
            &[input],
            &[current],
            Some(&self.name),
        )?);
        Ok(())
    }

    /// 已构建的底层Container
    pub fn container(&self) -> Result<&Container, GraphError> {
        self.container.as_ref().ok_or_else(|| {
            GraphError::InvalidOperation("Sequential尚未构建（请先调用build）".to_string())
        })
    }

    // ========== Container 委托 ==========

    pub fn call(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>, GraphError> {
        self.container()?.call(inputs)
    }

    pub fn call_with_mode(
        &self,
        inputs: &[Tensor],
        training: bool,
    ) -> Result<Vec<Tensor>, GraphError> {
        self.container()?.call_with_mode(inputs, training)
    }

    pub fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        self.container()?.compute_output_shape(input_shapes)
    }

    pub fn summary(&self) -> Result<(), GraphError> {
        self.container()?.summary()
    }

    pub fn save_model<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), GraphError> {
        self.container()?.save_model(path)
    }
}
