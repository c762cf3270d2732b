/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Graph 模块：符号图工作区
 *
 * 公开 API：
 * - `Graph`: 用户级句柄（层与符号张量都在其上创建）
 * - `GraphInner`: 底层实现（容器与序列化使用）
 * - `GraphError`: 错误类型
 */

mod error;
mod handle;
mod inner;

pub use error::GraphError;
pub use handle::Graph;
pub use inner::GraphInner;
