use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use matter_topology::{
    Body, CustomMobility, FixedMobility, MassProperties, MatterSubsystem, MobilizedBody,
    MobilizerKind, TopologyError, Transform,
};

#[test]
fn test_builtin_kind_widths() {
    let table = [
        (MobilizerKind::Pin, 1),
        (MobilizerKind::Slider, 1),
        (MobilizerKind::default_screw(), 1),
        (MobilizerKind::Universal, 2),
        (MobilizerKind::Cylinder, 2),
        (MobilizerKind::BendStretch, 2),
        (MobilizerKind::LineOrientation, 2),
        (MobilizerKind::Planar, 3),
        (MobilizerKind::Gimbal, 3),
        (MobilizerKind::Ball, 3),
        (MobilizerKind::Translation, 3),
        (MobilizerKind::FreeLine, 5),
        (MobilizerKind::Free, 6),
        (MobilizerKind::Weld, 0),
        (MobilizerKind::Ground, 0),
    ];
    for (kind, width) in table {
        assert_eq!(kind.nq(), width, "{} nq", kind.name());
        assert_eq!(kind.nu(), width, "{} nu", kind.name());
        assert_eq!(kind.default_q(), vec![0.0; width]);
    }
}

#[test]
fn test_detached_body_defaults() {
    let ball = MobilizedBody::ball();
    assert_eq!(ball.nq(), 3);
    assert_eq!(ball.default_q_vec3(), Some(Vec3::ZERO));
    assert_eq!(ball.one_default_q(), None);
    assert!(ball.body().is_none());
    assert!(!ball.is_in_subsystem());
    assert_eq!(ball.id(), None);
    assert_eq!(*ball.default_inboard_frame(), Transform::IDENTITY);
    assert_eq!(*ball.default_outboard_frame(), Transform::IDENTITY);
}

#[test]
fn test_default_q_width_is_enforced() {
    let mut slider = MobilizedBody::slider();
    slider.set_default_q(&[0.25]).unwrap();
    assert_eq!(slider.one_default_q(), Some(0.25));
    assert_eq!(
        slider.set_default_q(&[1.0, 2.0]).unwrap_err(),
        TopologyError::WidthMismatch {
            requested: 2,
            actual: 1
        }
    );

    let mut gimbal = MobilizedBody::gimbal();
    *gimbal.default_q_as_mut::<3>().unwrap() = [0.1, 0.2, 0.3];
    assert_eq!(gimbal.default_q_vec3(), Some(Vec3::new(0.1, 0.2, 0.3)));
    assert!(gimbal.default_q_as::<2>().is_none());
}

#[test]
fn test_screw_pitch() {
    let mut screw = MobilizedBody::screw(0.5);
    assert_eq!(screw.screw_pitch(), Some(0.5));
    screw.set_screw_pitch(2.0).unwrap();
    assert_relative_eq!(screw.screw_pitch().unwrap(), 2.0);

    let mut pin = MobilizedBody::pin();
    assert_eq!(pin.screw_pitch(), None);
    assert_eq!(
        pin.set_screw_pitch(1.0).unwrap_err(),
        TopologyError::WrongKind {
            expected: "Screw",
            actual: "Pin"
        }
    );
}

#[derive(Debug)]
struct Quaternion3;

impl CustomMobility for Quaternion3 {
    fn nq(&self) -> usize {
        4
    }

    fn nu(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "quaternion-ball"
    }

    fn default_q(&self) -> Vec<f32> {
        vec![1.0, 0.0, 0.0, 0.0]
    }
}

#[test]
fn test_custom_mobility_widths_and_defaults() {
    let custom = MobilizedBody::custom(Quaternion3);
    assert_eq!(custom.nq(), 4);
    assert_eq!(custom.nu(), 3);
    assert_eq!(custom.default_q(), &[1.0, 0.0, 0.0, 0.0]);
    assert_eq!(custom.custom_mobility().unwrap().name(), "quaternion-ball");
    assert_eq!(custom.kind().name(), "Custom");

    let fixed = MobilizedBody::custom(FixedMobility::new(2, 2));
    assert_eq!(fixed.default_q(), &[0.0, 0.0]);
}

#[test]
fn test_custom_mobility_in_state() {
    let mut matter = MatterSubsystem::new();
    let pin = matter
        .add_mobilized_body(matter.ground(), MobilizerKind::Pin, Body::default())
        .unwrap();
    let custom = matter
        .add_mobilized_body(pin, MobilizerKind::custom(Quaternion3), Body::default())
        .unwrap();

    let state = matter.realize_and_create_state();
    assert_eq!(state.q(), &[0.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(state.u().len(), 4);
    assert_eq!(matter.q_range(custom, &state).unwrap().offset, 1);
    assert_eq!(matter.u_range(custom, &state).unwrap().count, 3);
}

#[test]
fn test_frames_and_body_update() {
    let inboard = Transform::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_z(0.3));
    let outboard = Transform::from_translation(Vec3::new(0.0, -0.5, 0.0));
    let mass = MassProperties::solid_sphere(2.0, 0.1);

    let mut matter = MatterSubsystem::new();
    let id = matter
        .add_mobilized_body_with_frames(
            matter.ground(),
            inboard,
            MobilizerKind::Pin,
            Body::rigid(mass).unwrap(),
            outboard,
        )
        .unwrap();

    let body = matter.mobilized_body(id).unwrap();
    assert_eq!(*body.default_inboard_frame(), inboard);
    assert_eq!(*body.default_outboard_frame(), outboard);
    assert_relative_eq!(
        body.body().and_then(Body::mass_properties).unwrap().mass,
        2.0
    );

    matter
        .set_body(id, Body::rigid(MassProperties::point_mass(3.0, Vec3::ZERO)).unwrap())
        .unwrap();
    assert_relative_eq!(
        matter
            .mobilized_body(id)
            .unwrap()
            .body()
            .and_then(Body::mass_properties)
            .unwrap()
            .mass,
        3.0
    );
    assert!(matter.set_body(matter.ground(), Body::default()).is_err());
}

#[test]
fn test_invalid_mass_properties_rejected() {
    let bad = MassProperties::point_mass(-1.0, Vec3::ZERO);
    assert!(matches!(
        Body::rigid(bad),
        Err(TopologyError::InvalidMassProperties(_))
    ));
}

#[test]
fn test_second_ground_rejected() {
    let mut matter = MatterSubsystem::new();
    assert_eq!(
        matter
            .add_mobilized_body(matter.ground(), MobilizerKind::Ground, Body::default())
            .unwrap_err(),
        TopologyError::SecondGround
    );
    assert_eq!(matter.num_mobilized_bodies(), 1);
}

#[test]
fn test_unvalidated_rigid_body_rejected_by_subsystem() {
    let bad = Body::Rigid(MassProperties::point_mass(f32::NAN, Vec3::ZERO));
    let mut matter = MatterSubsystem::new();
    assert!(matches!(
        matter.add_mobilized_body(matter.ground(), MobilizerKind::Pin, bad),
        Err(TopologyError::InvalidMassProperties(_))
    ));
    assert_eq!(matter.num_mobilized_bodies(), 1);

    let pin = matter
        .add_mobilized_body(matter.ground(), MobilizerKind::Pin, Body::default())
        .unwrap();
    let generation = matter.generation();
    assert!(matches!(
        matter.set_body(pin, bad),
        Err(TopologyError::InvalidMassProperties(_))
    ));
    assert_eq!(matter.generation(), generation);
    assert_eq!(
        matter.mobilized_body(pin).unwrap().body(),
        Some(&Body::default())
    );
}
