use crate::{
    api::{payslip, periods},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiter. Build it once and hand clones to every worker so they share
/// one quota.
pub fn build_limiter(requests_per_min: u32) -> Limiter {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Arc::new(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Limiter) {
    // Registered ahead of the payslip scope so that an API path of `/api`
    // cannot swallow it as a citizen ID.
    cfg.service(web::resource(periods::PERIODS_PATH).route(web::get().to(periods::list_periods)))
        .service(
            web::scope(&config.api_path)
                .wrap(limiter)
                .configure(payslip::endpoint),
        );
}
