/* vdisk 的整体架构，自下而上 */

// 错误类型层
mod error;
pub use error::{Error, Result};

// 字节编解码层：定长小端记录的手写编解码
mod codec;

// 镜像文件层：宿主机上的平面磁盘镜像
mod image;
pub use image::ImageFile;

// 磁盘数据结构层：镜像内所有定长记录
pub mod layout;

// 分区管理层：MBR 槽位与 EBR 链
pub mod disk;

// 挂载表：分区ID到镜像路径的进程级映射
mod mount;
pub use mount::{MountPoint, MountTable};

// 文件系统层：超级块、位图分配器、目录与文件
pub mod fs;

// 用户目录：/users.txt 的解析与改写
pub mod users;

// 会话层：进程级身份
mod session;
pub use session::Session;

// 命令分发层：经过词法分析的命令在此校验并执行
pub mod commands;
pub use commands::{Command, Dispatcher};

// 报表层：Graphviz DOT 文本生成
pub mod reports;

/// 超级块魔数，与 ext2 一致
pub const MAGIC: i32 = 0xEF53;

/// 挂载ID的前缀（学号尾数）
pub const CARNET: &str = "67";

use std::time::{SystemTime, UNIX_EPOCH};

/// 当前 Unix 秒，按镜像格式要求压缩成 f32
pub(crate) fn now_f32() -> f32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as f32)
        .unwrap_or(0.0)
}
