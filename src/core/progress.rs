//! 寻路进度估算：由起始距离、当前距离与已用时间推出速度和 ETA

/// 一次进度采样
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementProgress {
    /// 当前到目标的直线距离
    pub distance: f64,
    /// 平均速度（方块/秒），可能为负（越走越远）
    pub speed: f64,
    /// 剩余时间（秒）；速度不为正时未知
    pub eta: Option<f64>,
}

impl MovementProgress {
    pub fn sample(initial_distance: f64, distance: f64, elapsed_secs: f64) -> Self {
        let speed = if elapsed_secs > 0.0 {
            (initial_distance - distance) / elapsed_secs
        } else {
            0.0
        };
        let eta = (speed > 0.0).then(|| distance / speed);
        Self {
            distance,
            speed,
            eta,
        }
    }

    /// 控制台显示文本
    pub fn describe(&self) -> String {
        let eta = match self.eta {
            Some(secs) => format!("{secs:.0}秒"),
            None => "未知".to_string(),
        };
        format!(
            "移动进度: 距离={:.2}方块, 速度={:.2}方块/秒, ETA={}",
            self.distance, self.speed, eta
        )
    }
}
