/// 命令模块
///
/// 包含日志查看页与业务页面可调用的命令:
/// - log_commands: 日志查询、导出、清空与页面事件提交

pub mod log_commands;
