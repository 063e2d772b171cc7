#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use hovertip_core::event::{EventKind, HostEvent};
use hovertip_core::geometry::Rect;
use hovertip_core::memory::MemoryDocument;
use hovertip_widgets::controller::TooltipController;
use hovertip_widgets::overlay::ShowRequest;
use hovertip_widgets::placement::PlacementResolver;
use hovertip_widgets::trigger::BindingConfig;
use std::hint::black_box;

fn bench_placement(c: &mut Criterion) {
    let mut group = c.benchmark_group("hovertip/placement");
    let resolver = PlacementResolver::default();

    group.bench_function("resolve_sweep_64", |b| {
        b.iter(|| {
            for step in 0..64 {
                let rect = Rect::new(10.0, f64::from(step) * 12.5, 80.0, 20.0);
                let decision = resolver.resolve(black_box(rect), black_box(800.0));
                black_box(decision.placement);
            }
        });
    });

    group.finish();
}

fn bench_show_hide(c: &mut Criterion) {
    let mut group = c.benchmark_group("hovertip/overlay");

    group.bench_function("show_replace_hide_8_triggers", |b| {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let triggers: Vec<_> = (0..8)
            .map(|i| doc.create_element(None, Rect::new(f64::from(i) * 120.0, 300.0, 100.0, 24.0)))
            .collect();
        let mut tips = TooltipController::default();
        b.iter(|| {
            for el in &triggers {
                let outcome = tips.show_tooltip(&mut doc, ShowRequest::new(*el, "benchmark tooltip"));
                black_box(outcome);
            }
            tips.run_deferred(&mut doc);
            black_box(tips.hide_tooltip(&mut doc));
        });
    });

    group.bench_function("hover_cycle_with_tick", |b| {
        let mut doc = MemoryDocument::new(1280.0, 800.0);
        let el = doc.create_element(None, Rect::new(200.0, 200.0, 100.0, 24.0));
        let mut tips = TooltipController::default();
        let id = tips.bind(&mut doc, el, BindingConfig::new("hover me"));
        let Some(handlers) = tips.binding(id).map(|b| *b.handlers()) else {
            return;
        };
        let enter = HostEvent::new(EventKind::MouseEnter);
        let leave = HostEvent::new(EventKind::MouseLeave);
        b.iter(|| {
            black_box(tips.dispatch(&mut doc, handlers.enter, &enter));
            tips.run_deferred(&mut doc);
            black_box(tips.dispatch(&mut doc, handlers.leave, &leave));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_placement, bench_show_hide);
criterion_main!(benches);
