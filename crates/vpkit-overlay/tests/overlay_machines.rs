//! Cross-service overlay behavior driven through one session context:
//! gesture-driven control visibility, feature/control interplay, and the
//! composed slot pipeline under rotation.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use vpkit_core::source::{GestureEvent, GestureRegion, GestureService, ScreenStatus, StatusService};
use vpkit_core::{Context, Service};
use vpkit_overlay::{
    ANIMATION_SETTLE, ContentItem, ControlService, ControlSlot, DisplayStyle, FeatureDirection,
    FeatureHooks, FeatureService, FeatureStyle, SlotConfig, ToastService, Transition,
};

const MS: Duration = Duration::from_millis(1);

fn center_tap(ctx: &Rc<Context>) {
    ctx.get::<GestureService>()
        .emit(GestureEvent::tap(GestureRegion::Center));
}

/// The canonical auto-hide timeline: tap shows at t0 and schedules a hide at
/// t0+5s; a second tap at t0+2s hides immediately and cancels; a third tap
/// at t0+3s shows again and hides at t0+8s.
#[test]
fn auto_hide_debounce_timeline() {
    let ctx = Context::new();
    let controls = ctx.get::<ControlService>();
    controls.set_display_style(DisplayStyle::Auto {
        first_appear: false,
        duration: 5000 * MS,
    });

    let log = Rc::new(RefCell::new(Vec::new()));
    let l = Rc::clone(&log);
    let _sub = controls
        .presented_cell()
        .subscribe(move |v| l.borrow_mut().push(*v));

    center_tap(&ctx); // t0: show
    ctx.advance(2000 * MS);
    center_tap(&ctx); // t0+2s: hide immediately
    ctx.advance(1000 * MS);
    center_tap(&ctx); // t0+3s: show again
    ctx.advance(4999 * MS); // t0+7.999s: still within the fresh window
    assert!(controls.is_presented());
    ctx.advance(MS); // t0+8s: auto-hide
    assert!(!controls.is_presented());

    assert_eq!(*log.borrow(), vec![true, false, true, false]);
}

#[test]
fn feature_presentation_leaves_control_state_alone() {
    let ctx = Context::new();
    let controls = ctx.get::<ControlService>();
    let feature = ctx.get::<FeatureService>();
    controls.set_display_style(DisplayStyle::Manual { first_appear: true });

    feature.present(
        FeatureDirection::Right,
        FeatureStyle::Squeeze(320.0),
        Rc::new("episode-list") as ContentItem,
        FeatureHooks::default(),
    );
    assert!(controls.is_presented(), "planes are independent");
    assert_eq!(
        feature.current().expect("presenting").squeeze_insets().trailing,
        320.0
    );

    feature.dismiss();
    ctx.advance(ANIMATION_SETTLE);
    assert!(controls.is_presented());
}

#[test]
fn feature_hooks_can_drive_sibling_services() {
    let ctx = Context::new();
    let feature = ctx.get::<FeatureService>();
    let toasts = ctx.get::<ToastService>();

    // A panel that announces itself through a toast once its slide settles.
    let handle = ctx.handle();
    feature.present(
        FeatureDirection::Bottom,
        FeatureStyle::Cover,
        Rc::new("share-sheet") as ContentItem,
        FeatureHooks {
            after_present: Some(Rc::new(move || {
                if let Some(ctx) = handle.upgrade() {
                    ctx.get::<ToastService>().toast(Rc::new("shared"));
                }
            })),
            ..FeatureHooks::default()
        },
    );
    assert_eq!(toasts.count(), 0, "hook waits for the animation to settle");

    ctx.advance(ANIMATION_SETTLE);
    assert_eq!(toasts.count(), 1);
}

#[test]
fn rotation_switches_composed_slots_between_composes() {
    let ctx = Context::new();
    let controls = ctx.get::<ControlService>();

    for (status, label) in [
        (ScreenStatus::HalfScreen, "compact-bar"),
        (ScreenStatus::FullScreen, "full-bar"),
        (ScreenStatus::Portrait, "portrait-bar"),
    ] {
        controls.configure(
            status,
            ControlSlot::Bottom1,
            SlotConfig {
                builders: vec![Rc::new(move || Rc::new(label) as ContentItem)],
                transition: Transition::Fade,
                ..SlotConfig::default()
            },
        );
    }

    let status = ctx.get::<StatusService>();
    let composed_label = |controls: &ControlService| {
        controls
            .compose(ControlSlot::Bottom1)
            .expect("configured")
            .items[0]
            .downcast_ref::<&str>()
            .copied()
    };

    assert_eq!(composed_label(&controls), Some("compact-bar"));
    status.set_status(ScreenStatus::Portrait);
    assert_eq!(composed_label(&controls), Some("portrait-bar"));
    status.set_status(ScreenStatus::FullScreen);
    assert_eq!(composed_label(&controls), Some("full-bar"));
}

#[test]
fn one_changed_subscription_covers_every_plane_of_a_service() {
    let ctx = Context::new();
    let controls = ctx.get::<ControlService>();
    controls.set_display_style(DisplayStyle::Manual { first_appear: false });

    let fires = Rc::new(std::cell::Cell::new(0u32));
    let f = Rc::clone(&fires);
    let _sub = controls.core().subscribe_changed(move || f.set(f.get() + 1));

    controls.present(); // visibility write
    controls.configure(
        ScreenStatus::HalfScreen,
        ControlSlot::Top1,
        SlotConfig::default(),
    ); // slot table write
    assert_eq!(fires.get(), 2);
}
