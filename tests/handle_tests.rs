use matter_topology::{
    Body, Constraint, ConstraintHandle, MatterSubsystem, MobilizedBody, MobilizedBodyHandle,
    TopologyError,
};

#[test]
fn test_copy_of_owner_is_independent() {
    let original = MobilizedBodyHandle::new(MobilizedBody::slider());
    let mut copy = MobilizedBodyHandle::empty();
    copy.assign_copy(&original);

    copy.get_mut().unwrap().set_default_q(&[3.0]).unwrap();
    assert_eq!(copy.get().unwrap().one_default_q(), Some(3.0));
    assert_eq!(original.get().unwrap().one_default_q(), Some(0.0));
    assert!(original.is_owner() && copy.is_owner());
}

#[test]
fn test_disown_moves_without_copy() {
    let mut owner = MobilizedBodyHandle::new(MobilizedBody::ball());
    let before: *const MobilizedBody = owner.get().unwrap();
    let mut heir = MobilizedBodyHandle::empty();

    owner.disown(&mut heir).unwrap();
    assert!(owner.is_empty());
    assert!(heir.is_owner());
    assert!(std::ptr::eq(before, heir.get().unwrap()));
}

#[test]
fn test_disown_preconditions() {
    let mut owner = MobilizedBodyHandle::new(MobilizedBody::pin());
    let mut occupied = MobilizedBodyHandle::new(MobilizedBody::slider());
    assert_eq!(
        owner.disown(&mut occupied).unwrap_err(),
        TopologyError::DestinationNotEmpty
    );
    assert!(owner.is_owner());

    let mut empty = MobilizedBodyHandle::empty();
    let mut target = MobilizedBodyHandle::empty();
    assert_eq!(empty.disown(&mut target).unwrap_err(), TopologyError::NotOwner);
}

#[test]
fn test_adoption_turns_owner_into_reference() {
    let mut matter = MatterSubsystem::new();
    let mut handle = MobilizedBodyHandle::new(MobilizedBody::pin().with_body(Body::default()));

    let id = matter.adopt_handle(matter.ground(), &mut handle).unwrap();
    assert!(handle.is_reference());
    assert_eq!(handle.target().unwrap(), (matter.id(), id));
    assert_eq!(matter.resolve(&handle).unwrap(), id);
    assert_eq!(matter.mobilized_body(id).unwrap().owner(), Some(matter.id()));

    // Adopting the reference again is refused and leaves it untouched.
    assert_eq!(
        matter.adopt_handle(matter.ground(), &mut handle).unwrap_err(),
        TopologyError::AlreadyAdopted("mobilized body")
    );
    assert!(handle.is_reference());
}

#[test]
fn test_failed_adoption_keeps_ownership() {
    let mut matter = MatterSubsystem::new();
    let other = MatterSubsystem::new();
    let stray = other.handle(other.ground()).unwrap();
    let mut handle = MobilizedBodyHandle::new(MobilizedBody::slider());

    let bad_parent = matter.resolve(&stray).unwrap_err();
    assert!(matches!(bad_parent, TopologyError::SubsystemMismatch { .. }));

    let ground = matter.ground();
    let mut second_ground = MobilizedBodyHandle::new(matter.detached_copy(ground).unwrap());
    assert_eq!(
        matter.adopt_handle(ground, &mut second_ground).unwrap_err(),
        TopologyError::SecondGround
    );
    assert!(second_ground.is_owner());

    let id = matter.adopt_handle(ground, &mut handle).unwrap();
    assert_eq!(matter.num_mobilized_bodies(), 2);
    assert_eq!(matter.parent_of(id).unwrap(), Some(matter.ground()));
}

#[test]
fn test_reference_into_owner_fails() {
    let matter = MatterSubsystem::new();
    let reference = matter.handle(matter.ground()).unwrap();
    let mut owner = MobilizedBodyHandle::new(MobilizedBody::pin());
    assert_eq!(
        owner.assign_reference(&reference).unwrap_err(),
        TopologyError::OwnerReassignment
    );
    assert!(owner.is_owner());

    let mut alias = MobilizedBodyHandle::empty();
    alias.assign_reference(&reference).unwrap();
    assert_eq!(alias.target().unwrap(), reference.target().unwrap());

    let detached = MobilizedBodyHandle::new(MobilizedBody::pin());
    assert_eq!(
        alias.assign_reference(&detached).unwrap_err(),
        TopologyError::NotAdopted("mobilized body")
    );
}

#[test]
fn test_copy_of_reference_aliases_same_entity() {
    let mut matter = MatterSubsystem::new();
    let pin = matter
        .adopt_mobilized_body(matter.ground(), MobilizedBody::pin())
        .unwrap();
    let first = matter.handle(pin).unwrap();
    let mut second = MobilizedBodyHandle::empty();
    second.assign_copy(&first);
    assert_eq!(matter.resolve(&second).unwrap(), pin);
    assert_eq!(matter.num_mobilized_bodies(), 2);
}

#[test]
fn test_constraint_handle_adoption() {
    let mut matter = MatterSubsystem::new();
    let pin = matter
        .adopt_mobilized_body(matter.ground(), MobilizedBody::pin())
        .unwrap();
    let mut handle = ConstraintHandle::new(Constraint::rod(matter.ground(), pin, 1.0).unwrap());
    let id = matter.adopt_constraint_handle(&mut handle).unwrap();
    assert!(handle.is_reference());
    assert_eq!(matter.constraint_handle(id).unwrap().target(), handle.target());

    let mut empty = ConstraintHandle::default();
    assert_eq!(
        matter.adopt_constraint_handle(&mut empty).unwrap_err(),
        TopologyError::EmptyHandle
    );
}

#[test]
fn test_unadopted_handle_cannot_reach_state() {
    let mut matter = MatterSubsystem::new();
    matter.realize_topology();
    let detached = MobilizedBodyHandle::new(MobilizedBody::pin());
    assert_eq!(
        matter.resolve(&detached).unwrap_err(),
        TopologyError::NotAdopted("mobilized body")
    );
    assert_eq!(
        matter.resolve(&MobilizedBodyHandle::empty()).unwrap_err(),
        TopologyError::EmptyHandle
    );
}
