/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Container 的（反）序列化：
 *                 - from_descriptor：按描述符重建图并重放全部层应用
 *                 - save_weights/load_weights：权重的二进制存取
 *                 - save_model/load_model：拓扑 JSON + 权重 bin 的成对存取
 *
 * 重放用的是“能走就走”的循环：每一轮把所有输入已就绪、且轮到它的
 * 应用重放掉；一轮下来毫无进展说明描述符里有环或悬空引用，直接报错。
 */

use super::Container;
use crate::nn::descriptor::{GraphDescriptor, LayerTypeDescriptor, TensorSlotDescriptor};
use crate::nn::graph::{Graph, GraphError};
use crate::nn::layer::{LayerId, LayerKind};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

impl Container {
    /// 权重文件魔数
    const PARAMS_MAGIC: &'static [u8; 4] = b"OKPR";
    /// 权重文件版本
    const PARAMS_VERSION: u32 = 1;

    // ========== 拓扑重建 ==========

    /// 从描述符重建容器（层为新初始化的权重；需要原权重请随后load_weights）
    pub fn from_descriptor(descriptor: &GraphDescriptor) -> Result<Self, GraphError> {
        let graph = Graph::with_name(&descriptor.name);

        // 1. 注册所有层；Input层直接铸造源节点
        let mut layer_ids: HashMap<String, LayerId> = HashMap::new();
        let mut produced: HashMap<(String, usize), Vec<SymbolicTensor>> = HashMap::new();
        for layer_desc in &descriptor.layers {
            match &layer_desc.layer_type {
                LayerTypeDescriptor::Input { shape, dtype } => {
                    let tensor = graph.inner_mut().new_input(
                        &DynamicShape::new(shape),
                        *dtype,
                        Some(&layer_desc.name),
                    )?;
                    produced.insert((layer_desc.name.clone(), 0), vec![tensor]);
                }
                other => {
                    let kind = LayerKind::from_descriptor(other)?;
                    let id = graph.inner_mut().add_layer(kind, Some(&layer_desc.name))?;
                    layer_ids.insert(layer_desc.name.clone(), id);
                }
            }
        }

        // 2. 重放所有层应用
        let mut pending: Vec<(&str, usize, &[TensorSlotDescriptor])> = Vec::new();
        for layer_desc in &descriptor.layers {
            for (app_index, slots) in layer_desc.inbound_nodes.iter().enumerate() {
                pending.push((&layer_desc.name, app_index, slots));
            }
        }
        let mut replayed: HashMap<&str, usize> = HashMap::new();
        while !pending.is_empty() {
            let mut progressed = false;
            let mut remaining = Vec::new();
            for (layer_name, app_index, slots) in pending {
                // 同一层的应用必须按节点序号依次重放
                let in_order = replayed.get(layer_name).copied().unwrap_or(0) == app_index;
                let ready = in_order
                    && slots
                        .iter()
                        .all(|s| produced.contains_key(&(s.layer.clone(), s.node_index)));
                if !ready {
                    remaining.push((layer_name, app_index, slots));
                    continue;
                }

                let inputs = slots
                    .iter()
                    .map(|slot| Self::resolve_slot(&produced, slot))
                    .collect::<Result<Vec<_>, _>>()?;
                let layer_id = layer_ids.get(layer_name).copied().ok_or_else(|| {
                    GraphError::InvalidOperation(format!(
                        "描述符引用了未定义的层{}",
                        layer_name
                    ))
                })?;
                let outputs = graph.inner_mut().apply_layer(layer_id, &inputs)?;
                produced.insert((layer_name.to_string(), app_index), outputs);
                *replayed.entry(layer_name).or_insert(0) += 1;
                progressed = true;
            }
            pending = remaining;
            if !progressed && !pending.is_empty() {
                return Err(GraphError::InvalidOperation(
                    "无法从描述符重建图：存在无法解析的拓扑引用（可能含有环或悬空引用）"
                        .to_string(),
                ));
            }
        }

        // 3. 解析容器的输入/输出并固化
        let inputs = descriptor
            .input_layers
            .iter()
            .map(|slot| Self::resolve_slot(&produced, slot))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = descriptor
            .output_layers
            .iter()
            .map(|slot| Self::resolve_slot(&produced, slot))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_io(&graph, &inputs, &outputs, Some(&descriptor.name))
    }

    fn resolve_slot(
        produced: &HashMap<(String, usize), Vec<SymbolicTensor>>,
        slot: &TensorSlotDescriptor,
    ) -> Result<SymbolicTensor, GraphError> {
        produced
            .get(&(slot.layer.clone(), slot.node_index))
            .and_then(|outputs| outputs.get(slot.tensor_index))
            .cloned()
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "描述符中的张量引用无法解析：{}:{}:{}",
                    slot.layer, slot.node_index, slot.tensor_index
                ))
            })
    }

    // ========== 权重二进制存取 ==========

    /// 保存容器内所有层的权重到二进制文件
    pub fn save_weights<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let file = File::create(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法创建权重文件: {e}")))?;
        let mut writer = BufWriter::new(file);

        let inner = self.graph.inner();
        let mut entries: Vec<(String, Tensor)> = Vec::new();
        for &layer_id in self.layers() {
            let layer_name = inner.get_layer(layer_id)?.name().to_string();
            for (weight_name, tensor) in inner.layer_weights(layer_id)? {
                entries.push((format!("{}/{}", layer_name, weight_name), tensor));
            }
        }
        drop(inner);

        writer
            .write_all(Self::PARAMS_MAGIC)
            .map_err(|e| GraphError::ComputationError(format!("写入魔数失败: {e}")))?;
        writer
            .write_all(&Self::PARAMS_VERSION.to_le_bytes())
            .map_err(|e| GraphError::ComputationError(format!("写入版本失败: {e}")))?;
        writer
            .write_all(&(entries.len() as u32).to_le_bytes())
            .map_err(|e| GraphError::ComputationError(format!("写入权重数量失败: {e}")))?;

        for (name, tensor) in &entries {
            let name_bytes = name.as_bytes();
            writer
                .write_all(&(name_bytes.len() as u32).to_le_bytes())
                .map_err(|e| GraphError::ComputationError(format!("写入名称长度失败: {e}")))?;
            writer
                .write_all(name_bytes)
                .map_err(|e| GraphError::ComputationError(format!("写入名称失败: {e}")))?;

            let shape = tensor.shape();
            writer
                .write_all(&(shape.len() as u32).to_le_bytes())
                .map_err(|e| GraphError::ComputationError(format!("写入形状维度失败: {e}")))?;
            for &dim in shape {
                writer
                    .write_all(&(dim as u32).to_le_bytes())
                    .map_err(|e| GraphError::ComputationError(format!("写入形状失败: {e}")))?;
            }

            for &value in tensor.data_as_slice() {
                writer
                    .write_all(&value.to_le_bytes())
                    .map_err(|e| GraphError::ComputationError(format!("写入数据失败: {e}")))?;
            }
        }

        writer
            .flush()
            .map_err(|e| GraphError::ComputationError(format!("刷新缓冲区失败: {e}")))?;
        Ok(())
    }

    /// 从二进制文件加载权重（按"层名/权重名"逐个覆写，形状必须一致）
    pub fn load_weights<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let file = File::open(path.as_ref())
            .map_err(|e| GraphError::ComputationError(format!("无法打开权重文件: {e}")))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| GraphError::ComputationError(format!("读取魔数失败: {e}")))?;
        if &magic != Self::PARAMS_MAGIC {
            return Err(GraphError::ComputationError(
                "无效的权重文件：这不是 only_keras 格式的权重文件。请确保使用 save_weights() 保存的文件。".to_string(),
            ));
        }

        let version = read_u32(&mut reader, "版本")?;
        if version != Self::PARAMS_VERSION {
            return Err(GraphError::ComputationError(format!(
                "不支持的权重文件版本: {version}"
            )));
        }

        let count = read_u32(&mut reader, "权重数量")?;
        for _ in 0..count {
            let name_len = read_u32(&mut reader, "名称长度")? as usize;
            let mut name_bytes = vec![0u8; name_len];
            reader
                .read_exact(&mut name_bytes)
                .map_err(|e| GraphError::ComputationError(format!("读取名称失败: {e}")))?;
            let full_name = String::from_utf8(name_bytes)
                .map_err(|e| GraphError::ComputationError(format!("权重名称不是合法UTF-8: {e}")))?;

            let ndim = read_u32(&mut reader, "形状维度")? as usize;
            let mut shape = Vec::with_capacity(ndim);
            for _ in 0..ndim {
                shape.push(read_u32(&mut reader, "形状")? as usize);
            }

            let size: usize = shape.iter().product();
            let mut data = Vec::with_capacity(size);
            for _ in 0..size {
                let mut bytes = [0u8; 4];
                reader
                    .read_exact(&mut bytes)
                    .map_err(|e| GraphError::ComputationError(format!("读取数据失败: {e}")))?;
                data.push(f32::from_le_bytes(bytes));
            }

            let (layer_name, weight_name) = full_name.rsplit_once('/').ok_or_else(|| {
                GraphError::ComputationError(format!(
                    "权重名称{}不符合\"层名/权重名\"格式",
                    full_name
                ))
            })?;
            self.set_weight(layer_name, weight_name, &Tensor::new(&data, &shape))?;
        }
        Ok(())
    }

    // ========== 完整模型存取 ==========

    /// 保存完整模型（拓扑 JSON + 权重 bin）
    ///
    /// 自动生成两个文件：
    /// - `{path}.json`: 容器的拓扑描述（可读）
    /// - `{path}.bin`: 权重数据（紧凑）
    ///
    /// # 示例
    /// ```ignore
    /// container.save_model("models/mnist")?;
    /// // 生成：models/mnist.json + models/mnist.bin
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        let bin_path = path.with_extension("bin");

        self.save_weights(&bin_path)?;

        let mut descriptor = self.describe()?;
        descriptor.params_file = Some(bin_path.file_name().map_or_else(
            || "params.bin".to_string(),
            |s| s.to_string_lossy().to_string(),
        ));

        let json = descriptor
            .to_json()
            .map_err(|e| GraphError::ComputationError(format!("序列化图描述失败: {e}")))?;
        std::fs::write(&json_path, json)
            .map_err(|e| GraphError::ComputationError(format!("写入 JSON 文件失败: {e}")))?;
        Ok(())
    }

    /// 加载完整模型：从 JSON 重建拓扑，再加载权重
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");

        let json = std::fs::read_to_string(&json_path)
            .map_err(|e| GraphError::ComputationError(format!("读取 JSON 文件失败: {e}")))?;
        let descriptor = GraphDescriptor::from_json(&json)
            .map_err(|e| GraphError::ComputationError(format!("解析图描述失败: {e}")))?;

        let container = Self::from_descriptor(&descriptor)?;
        if let Some(params_file) = &descriptor.params_file {
            let bin_path = json_path
                .parent()
                .map(|dir| dir.join(params_file))
                .unwrap_or_else(|| PathBuf::from(params_file));
            container.load_weights(&bin_path)?;
        }
        Ok(container)
    }
}

fn read_u32<R: Read>(reader: &mut R, what: &str) -> Result<u32, GraphError> {
    let mut bytes = [0u8; 4];
    reader
        .read_exact(&mut bytes)
        .map_err(|e| GraphError::ComputationError(format!("读取{what}失败: {e}")))?;
    Ok(u32::from_le_bytes(bytes))
}
