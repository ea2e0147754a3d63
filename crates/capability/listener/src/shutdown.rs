//! 关停信号
//!
//! 单一信号源，克隆后传播到每个协议循环与每个连接处理单元。
//! 基于 `tokio::sync::watch`：触发后所有等待者同时被唤醒，
//! 后续查询恒为已触发状态。

use tokio::sync::watch;

/// 关停信号源：进程内唯一，由顶层持有并触发。
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

/// 关停信号：可克隆的观察端。
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownController {
    /// 创建信号源与首个观察端。
    pub fn new() -> (Self, ShutdownSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, ShutdownSignal { rx })
    }

    /// 触发关停。重复触发无副作用。
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// 派生一个新的观察端。
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl ShutdownSignal {
    /// 是否已触发关停。
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// 挂起直到关停触发。
    ///
    /// 信号源被丢弃（进程退出路径）同样视为触发。
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_all_observers() {
        let (controller, signal) = ShutdownController::new();
        let second = controller.signal();
        assert!(!signal.is_cancelled());

        let waiter = tokio::spawn(async move {
            second.cancelled().await;
        });
        controller.trigger();

        signal.cancelled().await;
        assert!(signal.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("observer wakes")
            .expect("join");
    }

    #[tokio::test]
    async fn dropped_controller_counts_as_cancelled() {
        let (controller, signal) = ShutdownController::new();
        drop(controller);
        tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
            .await
            .expect("resolves");
    }

    #[tokio::test]
    async fn cancelled_resolves_after_trigger() {
        let (controller, signal) = ShutdownController::new();
        controller.trigger();
        // 触发之后创建的等待也立即完成
        tokio::time::timeout(Duration::from_secs(1), signal.cancelled())
            .await
            .expect("resolves");
    }
}
