//! Attacker pool construction.
//!
//! Instantiates attackers from the configured templates, scattered inside a
//! sphere around the target no larger than each attacker's reach. Templates
//! are cycled when the attacker count exceeds the template list.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use volley_core::config::PoolConfig;
use volley_core::types::Pose;
use volley_curves::record::random_in_unit_sphere;
use volley_curves::{CurveLibrary, SwingKeyframeSet};

use crate::handle::{AttackHandle, HandleId};
use crate::weapons::{build_weapon, up_along};

/// Number of attackers to build: fixed, or drawn from `[min_count, max_count]`.
pub fn attacker_count(config: &PoolConfig, rng: &mut ChaCha8Rng) -> usize {
    if config.use_random_count && config.max_count >= config.min_count {
        rng.gen_range(config.min_count..=config.max_count)
    } else {
        config.attacker_count
    }
}

/// Build a fresh pool of idle attack handles around `center`, each facing it.
pub fn build_pool(
    config: &PoolConfig,
    center: Vec3,
    library: &Arc<CurveLibrary>,
    keyframes: &Arc<SwingKeyframeSet>,
    rng: &mut ChaCha8Rng,
) -> Vec<AttackHandle> {
    if config.templates.is_empty() {
        tracing::warn!(target: "volley::pool", "pool.no_templates");
        return Vec::new();
    }

    let count = attacker_count(config, rng);
    let handles: Vec<AttackHandle> = (0..count)
        .map(|i| {
            let template = &config.templates[i % config.templates.len()];
            let mut weapon = build_weapon(template, center, library, keyframes, rng);
            let radius = config.position_range.min(weapon.reach());
            let offset = random_in_unit_sphere(rng) * radius;
            weapon.reposition(Pose::new(center + offset, up_along(-offset)));
            AttackHandle::new(HandleId(i as u32), weapon)
        })
        .collect();

    tracing::info!(
        target: "volley::pool",
        attackers = handles.len(),
        templates = config.templates.len(),
        center = %center,
        "pool.built"
    );
    handles
}
