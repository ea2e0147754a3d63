//! # 协议流处理能力模块
//!
//! 提供具体设备协议族的流处理实现，供监听核心按端口分发调用：
//! - **text-line**：换行分隔的 ASCII 上报（`LineDelimitedHandler`）
//! - **bin-frame**：大端 u16 长度前缀的二进制帧（`LengthPrefixedHandler`）
//!
//! 两种实现都遵循 StreamHandler 契约：有序 EOF 与关停信号返回 Ok，
//! 协议违规与 IO 失败返回 Err，且读取等待始终可被关停信号打断。

mod frame;
mod line;

pub use frame::LengthPrefixedHandler;
pub use line::LineDelimitedHandler;
