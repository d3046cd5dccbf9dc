//! 方块扫描：以自身位置为中心的立方体范围内查找名称匹配的方块

use super::traits::GameSession;
use super::types::{Block, Vec3};

/// .find_block / .open 的扫描半径
pub const SEARCH_RADIUS: i32 = 16;

/// 扫描结果：方块与它到扫描原点的距离
#[derive(Clone, Debug, PartialEq)]
pub struct BlockHit {
    pub block: Block,
    pub distance: f64,
}

/// 遍历 origin 周围 [-radius, radius]^3 的偏移，返回名称等于或包含 query 的方块
pub fn scan_cube(session: &dyn GameSession, origin: Vec3, radius: i32, query: &str) -> Vec<BlockHit> {
    let mut hits = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let probe = origin.offset(dx as f64, dy as f64, dz as f64);
                if let Some(block) = session.block_at(probe) {
                    if block.matches(query) {
                        hits.push(BlockHit {
                            distance: origin.distance_to(probe),
                            block,
                        });
                    }
                }
            }
        }
    }
    hits
}

/// 最近的匹配方块（距离相同时取先扫描到的）
pub fn nearest(session: &dyn GameSession, origin: Vec3, radius: i32, query: &str) -> Option<BlockHit> {
    scan_cube(session, origin, radius, query)
        .into_iter()
        .fold(None, |best: Option<BlockHit>, hit| match best {
            Some(b) if b.distance <= hit.distance => Some(b),
            _ => Some(hit),
        })
}
