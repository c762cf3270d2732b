/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Container 的描述符导出（describe）与模型摘要（summary）。
 *
 * 注意节点序号的重映射：层在容器外可能还有别的应用，
 * 描述符里的node_index只对容器内保留的节点连续编号，
 * 这样from_descriptor重放时序号才能对上。
 */

use super::Container;
use crate::nn::descriptor::{GraphDescriptor, LayerDescriptor, TensorSlotDescriptor};
use crate::nn::graph::{GraphError, GraphInner};
use crate::nn::layer::{LayerId, TraitLayer};
use crate::nn::symbolic::SymbolicTensor;
use std::collections::HashMap;

impl Container {
    // ========== 图描述（describe）==========

    /// 导出容器的描述符（用于序列化、模型重建、调试）
    ///
    /// # 示例
    /// ```ignore
    /// let descriptor = container.describe()?;
    /// println!("{}", descriptor.to_json().unwrap());
    /// ```
    pub fn describe(&self) -> Result<GraphDescriptor, GraphError> {
        let inner = self.graph.inner();
        let remap = self.node_index_remap(&inner)?;

        let mut descriptor = GraphDescriptor::new(&self.name);
        for &layer_id in &self.layers {
            let layer = inner.get_layer(layer_id)?;
            let mut inbound_nodes = Vec::new();
            for &node_id in layer.inbound_nodes() {
                if !self.container_nodes.contains(&node_id) {
                    continue;
                }
                let node = inner.get_node(node_id)?;
                if node.is_origin() {
                    continue;
                }
                let slots = node
                    .inbound()
                    .iter()
                    .map(|inbound| {
                        let source = inner.get_layer(inbound.layer)?;
                        let node_index = remap
                            .get(&(inbound.layer, inbound.node_index))
                            .copied()
                            .ok_or_else(|| {
                                GraphError::ComputationError(format!(
                                    "描述符导出失败：层{}的第{}个节点不在容器内",
                                    source.name(),
                                    inbound.node_index
                                ))
                            })?;
                        Ok(TensorSlotDescriptor {
                            layer: source.name().to_string(),
                            node_index,
                            tensor_index: inbound.tensor_index,
                        })
                    })
                    .collect::<Result<Vec<_>, GraphError>>()?;
                inbound_nodes.push(slots);
            }

            let param_count = layer.kind().param_count();
            descriptor.add_layer(LayerDescriptor {
                name: layer.name().to_string(),
                layer_type: layer.kind().to_descriptor(),
                inbound_nodes,
                param_count: (param_count > 0).then_some(param_count),
            });
        }

        descriptor.input_layers = self
            .inputs
            .iter()
            .map(|t| Self::slot_of(&inner, t, &remap))
            .collect::<Result<Vec<_>, _>>()?;
        descriptor.output_layers = self
            .outputs
            .iter()
            .map(|t| Self::slot_of(&inner, t, &remap))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(descriptor)
    }

    /// 容器内节点序号重映射：(层, 全局应用序号) -> 容器内连续序号
    fn node_index_remap(
        &self,
        inner: &GraphInner,
    ) -> Result<HashMap<(LayerId, usize), usize>, GraphError> {
        let mut remap = HashMap::new();
        for &layer_id in &self.layers {
            let layer = inner.get_layer(layer_id)?;
            let mut serial = 0;
            for (global_index, &node_id) in layer.inbound_nodes().iter().enumerate() {
                if self.container_nodes.contains(&node_id) {
                    remap.insert((layer_id, global_index), serial);
                    serial += 1;
                }
            }
        }
        Ok(remap)
    }

    fn slot_of(
        inner: &GraphInner,
        tensor: &SymbolicTensor,
        remap: &HashMap<(LayerId, usize), usize>,
    ) -> Result<TensorSlotDescriptor, GraphError> {
        let layer = inner.get_layer(tensor.source_layer())?;
        let node_index = remap
            .get(&(tensor.source_layer(), tensor.node_index()))
            .copied()
            .ok_or_else(|| {
                GraphError::ComputationError(format!(
                    "描述符导出失败：张量{}的来源节点不在容器内",
                    tensor.name()
                ))
            })?;
        Ok(TensorSlotDescriptor {
            layer: layer.name().to_string(),
            node_index,
            tensor_index: tensor.tensor_index(),
        })
    }

    // ========== 模型摘要（summary）==========

    /// 生成模型摘要表格（类似 Keras 的 `model.summary()`）
    pub fn summary_string(&self) -> Result<String, GraphError> {
        let inner = self.graph.inner();

        // 每层一行：层名称 (类型) | 输出形状 | 参数量 | 连接到
        let mut rows: Vec<[String; 4]> = Vec::new();
        for &layer_id in &self.layers {
            let layer = inner.get_layer(layer_id)?;
            let mut output_shape = "-".to_string();
            let mut connected = Vec::new();
            for &node_id in layer.inbound_nodes() {
                if !self.container_nodes.contains(&node_id) {
                    continue;
                }
                let node = inner.get_node(node_id)?;
                if output_shape == "-" {
                    if let Some(first) = node.output_tensors().first() {
                        output_shape = first.shape().to_string();
                    }
                }
                for inbound in node.inbound() {
                    let source = inner.get_layer(inbound.layer)?.name().to_string();
                    if !connected.contains(&source) {
                        connected.push(source);
                    }
                }
            }

            let param_count = layer.kind().param_count();
            rows.push([
                format!("{} ({})", layer.name(), layer.kind().type_name()),
                output_shape,
                param_count.to_string(),
                if connected.is_empty() {
                    "-".to_string()
                } else {
                    connected.join(", ")
                },
            ]);
        }

        let headers = ["层名称 (类型)", "输出形状", "参数量", "连接到"];
        let mut widths = headers.map(display_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(cell));
            }
        }

        let mut out = String::new();
        let horizontal = |left: &str, mid: &str, right: &str| {
            let mut line = left.to_string();
            for (i, width) in widths.iter().enumerate() {
                line.push_str(&"─".repeat(width + 2));
                line.push_str(if i + 1 == widths.len() { right } else { mid });
            }
            line.push('\n');
            line
        };
        let format_row = |cells: &[String; 4]| {
            let mut line = "│".to_string();
            for (width, cell) in widths.iter().zip(cells) {
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(width - display_width(cell) + 1));
                line.push('│');
            }
            line.push('\n');
            line
        };

        out.push_str(&format!("模型: {}\n", self.name));
        out.push_str(&horizontal("┌", "┬", "┐"));
        out.push_str(&format_row(&headers.map(str::to_string)));
        out.push_str(&horizontal("├", "┼", "┤"));
        for row in &rows {
            out.push_str(&format_row(row));
        }
        out.push_str(&horizontal("└", "┴", "┘"));
        out.push_str(&format!("总参数量: {}\n", self.param_count()?));
        Ok(out)
    }

    /// 打印模型摘要
    pub fn summary(&self) -> Result<(), GraphError> {
        println!("{}", self.summary_string()?);
        Ok(())
    }
}

/// 简易显示宽度：中日韩字符按2列计
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if (c as u32) < 0x2E80 { 1 } else { 2 })
        .sum()
}
