use lenscout_core::discovery::{DiscoveryService, ScanReport};
use tracing::{Span, info_span};

use crate::commands::ScanArgs;
use crate::commands::discover::{discovery_ends, progress_hook};
use crate::terminal::spinner;

pub async fn quick(args: &ScanArgs, quiet: u8) -> anyhow::Result<()> {
    let service = DiscoveryService::new(args.to_config()?)?;

    let span: Span = info_span!("quick", indicatif.pb_show = true);
    let targets: usize = service.config().targets.len();
    spinner::waiting(&span, targets);

    let report: ScanReport = {
        let _guard = span.enter();
        service
            .perform_quick_discovery(Some(progress_hook(&span, targets)))
            .await?
    };
    drop(span);

    discovery_ends(&report, &service.config().targets, quiet);
    Ok(())
}
