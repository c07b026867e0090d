//! Overlap tests between entity shapes
//!
//! Bullets and enemies are axis-aligned squares; the player and pickups are
//! circles.

use glam::Vec2;

use super::bullet::Bullet;
use super::enemy::Enemy;

/// Axis-aligned square overlap, both given by center and side length
pub fn squares_overlap(a_center: Vec2, a_size: f32, b_center: Vec2, b_size: f32) -> bool {
    let reach = (a_size + b_size) / 2.0;
    (a_center.x - b_center.x).abs() < reach && (a_center.y - b_center.y).abs() < reach
}

/// Circle overlap
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance_squared(b) < (a_radius + b_radius) * (a_radius + b_radius)
}

/// Unit vector pointing from `from` toward `to`; straight up when they coincide
pub fn separation_normal(from: Vec2, to: Vec2) -> Vec2 {
    let d = to - from;
    if d.length_squared() > f32::EPSILON {
        d.normalize()
    } else {
        Vec2::NEG_Y
    }
}

pub fn bullet_hits_enemy(bullet: &Bullet, enemy: &Enemy) -> bool {
    squares_overlap(bullet.pos, bullet.size, enemy.pos, enemy.size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bullet::BulletSource;
    use crate::sim::enemy::EnemyKind;
    use crate::tuning::EnemyTable;

    #[test]
    fn test_squares_overlap() {
        assert!(squares_overlap(Vec2::ZERO, 10.0, Vec2::new(9.0, 0.0), 10.0));
        assert!(!squares_overlap(Vec2::ZERO, 10.0, Vec2::new(10.0, 0.0), 10.0));
        // Diagonal corners still overlap as boxes
        assert!(squares_overlap(Vec2::ZERO, 10.0, Vec2::new(9.0, 9.0), 10.0));
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 9.0), 5.0));
    }

    #[test]
    fn test_separation_normal_fallback() {
        assert_eq!(separation_normal(Vec2::ONE, Vec2::ONE), Vec2::NEG_Y);
        let n = separation_normal(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert!((n - Vec2::new(0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_bullet_hits_enemy_box() {
        let table = EnemyTable::default();
        let pos = Vec2::new(100.0, 100.0);
        let enemy = Enemy::spawn(1, EnemyKind::Normal, pos, &table.normal, 1.0, 6);
        let near = Bullet::new(Vec2::new(135.0, 100.0), 0.0, 0.0, 8.0, 1.0, BulletSource::Turret);
        let far = Bullet::new(Vec2::new(140.0, 100.0), 0.0, 0.0, 8.0, 1.0, BulletSource::Turret);
        assert!(bullet_hits_enemy(&near, &enemy));
        assert!(!bullet_hits_enemy(&far, &enemy));
    }
}
