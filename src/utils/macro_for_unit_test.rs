/// 错误断言宏 - 灵活粒度验证 Result 错误
///
/// # 用法
/// - `assert_err!(expr)` — 只验证是 Err
/// - `assert_err!(expr, Variant(literal))` — 验证错误类型 + 精确消息（String 变体）
/// - `assert_err!(expr, Pattern { .. })` — 验证错误类型
/// - `assert_err!(expr, Pattern { field, .. } if condition)` — 验证类型 + 条件
///
/// # 示例
/// ```ignore
/// // 只验证是错误
/// assert_err!(result);
///
/// // 验证错误类型 + 精确消息（简洁语法）
/// assert_err!(result, GraphError::InvalidOperation("Add层至少需要2个输入"));
///
/// // 验证错误类型（忽略所有字段）
/// assert_err!(result, GraphError::ShapeMismatch { .. });
///
/// // 验证类型 + 关键字段
/// assert_err!(result, GraphError::ShapeMismatch { expected, .. } if expected == "[2, 2]");
///
/// // 验证消息包含关键词
/// assert_err!(result, GraphError::InvalidOperation(msg) if msg.contains("环"));
/// ```
#[macro_export]
macro_rules! assert_err {
    // 只验证是 Err
    ($expr:expr) => {
        assert!($expr.is_err(), "预期 Err，实际得到 {:?}", $expr);
    };
    // 简洁语法：Variant(字符串字面量) - 精确匹配 String 内容
    ($expr:expr, $err_type:ident :: $variant:ident ( $expected:literal )) => {
        match &$expr {
            Err($err_type::$variant(actual)) => assert_eq!(
                actual, $expected,
                "错误消息不匹配：预期 `{}`，实际得到 `{}`",
                $expected, actual
            ),
            Err(e) => panic!(
                "错误类型不匹配：预期 `{}::{}`，实际得到 `{:?}`",
                stringify!($err_type),
                stringify!($variant),
                e
            ),
            Ok(v) => panic!(
                "预期 Err({}::{})，实际得到 Ok({:?})",
                stringify!($err_type),
                stringify!($variant),
                v
            ),
        }
    };
    // 模式 + 条件
    ($expr:expr, $pattern:pat_param if $guard:expr) => {
        match &$expr {
            Err($pattern) if $guard => {}
            Err(e) => panic!(
                "错误不匹配：预期 `{} if {}`，实际得到 `{:?}`",
                stringify!($pattern),
                stringify!($guard),
                e
            ),
            Ok(v) => panic!(
                "预期 Err({})，实际得到 Ok({:?})",
                stringify!($pattern),
                v
            ),
        }
    };
    // 仅模式
    ($expr:expr, $pattern:pat_param) => {
        match &$expr {
            Err($pattern) => {}
            Err(e) => panic!(
                "错误不匹配：预期 `{}`，实际得到 `{:?}`",
                stringify!($pattern),
                e
            ),
            Ok(v) => panic!(
                "预期 Err({})，实际得到 Ok({:?})",
                stringify!($pattern),
                v
            ),
        }
    };
}
