// Writes TypeScript bindings for the dashboard view models
use csa_dashboard_lib::application::RunPhase;
use csa_dashboard_lib::types::{
    ActivityView, CustomerCard, DashboardView, HeaderView, IconGlyph, KpiCard, MetaTag,
    PerformanceView, RiskSegmentView, TagKind, Tone, WeightClass,
};
use ts_rs::TS;

fn export<T: TS + 'static>(failures: &mut usize) {
    match T::export_all() {
        Ok(()) => println!("exported {}", T::name()),
        Err(e) => {
            eprintln!("{} export error: {}", T::name(), e);
            *failures += 1;
        }
    }
}

fn main() {
    let mut failures = 0;

    export::<DashboardView>(&mut failures);
    export::<HeaderView>(&mut failures);
    export::<KpiCard>(&mut failures);
    export::<ActivityView>(&mut failures);
    export::<MetaTag>(&mut failures);
    export::<IconGlyph>(&mut failures);
    export::<Tone>(&mut failures);
    export::<WeightClass>(&mut failures);
    export::<TagKind>(&mut failures);
    export::<CustomerCard>(&mut failures);
    export::<RiskSegmentView>(&mut failures);
    export::<PerformanceView>(&mut failures);
    export::<RunPhase>(&mut failures);

    if failures > 0 {
        std::process::exit(1);
    }
    println!("TypeScript 타입 생성 완료");
}
