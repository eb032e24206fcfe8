#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Behaviour of each permission against a small blog fixture: four entries,
//! two written by `owner` and two by `other`.

use fastview_security::{
    Actor, ActorBuilder, Capability, Identity, MemoryCollection, Permission, Record,
    ResourceType, Row, Schema,
};
use uuid::Uuid;

struct Fixture {
    owner: Actor,
    other: Actor,
    staff: Actor,
    superuser: Actor,
    anonymous: Actor,
    entries: MemoryCollection<Row>,
}

fn entry_type() -> ResourceType {
    ResourceType::new("blog", "Entry")
}

fn user() -> ActorBuilder {
    Actor::builder().subject_id(Uuid::new_v4())
}

fn fixture() -> Fixture {
    let owner = user().build();
    let other = user().build();
    let rows = [&owner, &other, &owner, &other]
        .iter()
        .map(|author| {
            Row::new(entry_type(), Uuid::new_v4())
                .with_field("author", author.subject_id().unwrap())
        })
        .collect();

    Fixture {
        owner,
        other,
        staff: user().staff(true).build(),
        superuser: user().superuser(true).build(),
        anonymous: Actor::anonymous(),
        entries: MemoryCollection::new(Schema::new(entry_type()).with_field("author"), rows),
    }
}

impl Fixture {
    /// First entry, owned by `owner`.
    fn owned(&self) -> &Row {
        &self.entries.unrestricted()[0]
    }

    /// First entry not owned by `owner`.
    fn not_owned(&self) -> &Row {
        &self.entries.unrestricted()[1]
    }

    fn visible(&self, perm: &Permission, actor: &Actor) -> usize {
        perm.filter(actor, self.entries.clone()).unwrap().count()
    }

    fn check(&self, perm: &Permission, actor: &Actor, instance: Option<&Row>) -> bool {
        perm.check(actor, Some(&entry_type()), instance.map(|r| r as &dyn Record))
    }
}

#[test]
fn public_allows_everyone() {
    let f = fixture();
    assert!(f.check(&Permission::Public, &f.anonymous, None));
    assert_eq!(f.visible(&Permission::Public, &f.anonymous), 4);
}

#[test]
fn authenticated_requires_login() {
    let f = fixture();
    let perm = Permission::Authenticated;
    assert!(!f.check(&perm, &f.anonymous, None));
    assert_eq!(f.visible(&perm, &f.anonymous), 0);
    assert!(f.check(&perm, &f.owner, None));
    assert_eq!(f.visible(&perm, &f.owner), 4);
}

#[test]
fn staff_requires_staff_flag() {
    let f = fixture();
    let perm = Permission::Staff;
    for actor in [&f.anonymous, &f.owner] {
        assert!(!f.check(&perm, actor, None));
        assert_eq!(f.visible(&perm, actor), 0);
    }
    assert!(f.check(&perm, &f.staff, None));
    assert_eq!(f.visible(&perm, &f.staff), 4);
}

#[test]
fn superuser_requires_superuser_flag() {
    let f = fixture();
    let perm = Permission::Superuser;
    for actor in [&f.anonymous, &f.owner, &f.staff] {
        assert!(!f.check(&perm, actor, None));
        assert_eq!(f.visible(&perm, actor), 0);
    }
    assert!(f.check(&perm, &f.superuser, None));
    assert_eq!(f.visible(&perm, &f.superuser), 4);
}

#[test]
fn capability_requires_grant_or_superuser() {
    let f = fixture();
    let perm = Permission::capability("add");
    for actor in [&f.anonymous, &f.owner, &f.staff] {
        assert!(!f.check(&perm, actor, None));
        assert_eq!(f.visible(&perm, actor), 0);
    }
    assert!(f.check(&perm, &f.superuser, None));
    assert_eq!(f.visible(&perm, &f.superuser), 4);

    let granted = user()
        .add_capability(Capability::new("blog", "add_entry"))
        .build();
    assert!(f.check(&perm, &granted, None));
    assert_eq!(f.visible(&perm, &granted), 4);
}

#[test]
fn owner_matches_author() {
    let f = fixture();
    let perm = Permission::owner("author");

    assert!(!f.check(&perm, &f.anonymous, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.anonymous), 0);

    assert!(f.check(&perm, &f.owner, Some(f.owned())));
    let mine = perm.filter(&f.owner, f.entries.clone()).unwrap();
    assert_eq!(mine.count(), 2);
    let owner_id = f.owner.subject_id().unwrap();
    assert!(
        mine.iter()
            .all(|r| r.field_value("author") == Some(owner_id))
    );

    assert!(!f.check(&perm, &f.other, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.other), 2);

    for actor in [&f.staff, &f.superuser] {
        assert!(!f.check(&perm, actor, Some(f.owned())));
        assert_eq!(f.visible(&perm, actor), 0);
    }
}

#[test]
fn owner_and_staff() {
    let f = fixture();
    let perm = Permission::owner("author") & Permission::Staff;

    assert!(!f.check(&perm, &f.owner, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.owner), 0);
    assert!(!f.check(&perm, &f.staff, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.staff), 0);

    let staff_owner = f.owner.clone().with_staff(true);
    assert!(f.check(&perm, &staff_owner, Some(f.owned())));
    assert_eq!(f.visible(&perm, &staff_owner), 2);
}

#[test]
fn owner_or_staff() {
    let f = fixture();
    let perm = Permission::owner("author") | Permission::Staff;

    assert!(f.check(&perm, &f.owner, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.owner), 2);
    assert!(f.check(&perm, &f.staff, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.staff), 4);

    let staff_owner = f.owner.clone().with_staff(true);
    assert!(f.check(&perm, &staff_owner, Some(f.owned())));
    assert_eq!(f.visible(&perm, &staff_owner), 4);

    assert!(!f.check(&perm, &f.other, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.other), 2);
}

#[test]
fn not_owner_excludes_own_entries() {
    let f = fixture();
    let perm = !Permission::owner("author");

    assert!(!f.check(&perm, &f.owner, Some(f.owned())));
    assert!(f.check(&perm, &f.owner, Some(f.not_owned())));
    let visible = perm.filter(&f.owner, f.entries.clone()).unwrap();
    assert_eq!(visible.count(), 2);
    assert!(!visible.contains(f.owned().id()));
}

#[test]
fn staff_and_not_owner() {
    let f = fixture();
    let perm = Permission::Staff & !Permission::owner("author");
    let staff_owner = f.owner.clone().with_staff(true);

    assert!(!f.check(&perm, &staff_owner, Some(f.owned())));
    assert!(f.check(&perm, &staff_owner, Some(f.not_owned())));
    let visible = perm.filter(&staff_owner, f.entries.clone()).unwrap();
    assert_eq!(visible.count(), 2);
    assert!(!visible.contains(f.owned().id()));
    assert!(visible.contains(f.not_owned().id()));
}

#[test]
fn not_owner_for_anonymous_sees_everything() {
    let f = fixture();
    let perm = !Permission::owner("author");
    assert!(f.check(&perm, &f.anonymous, Some(f.owned())));
    assert_eq!(f.visible(&perm, &f.anonymous), 4);
}

#[test]
fn null_owner_field_is_never_owned() {
    let f = fixture();
    let orphan = Row::new(entry_type(), Uuid::new_v4()).with_null("author");
    let entries = MemoryCollection::new(
        Schema::new(entry_type()).with_field("author"),
        vec![orphan.clone()],
    );

    let owned = Permission::owner("author");
    assert!(!f.check(&owned, &f.owner, Some(&orphan)));
    assert_eq!(owned.filter(&f.owner, entries.clone()).unwrap().count(), 0);

    let not_owned = !Permission::owner("author");
    assert!(f.check(&not_owned, &f.owner, Some(&orphan)));
    assert_eq!(not_owned.filter(&f.owner, entries).unwrap().count(), 1);
}

#[test]
fn unknown_owner_field_fails_to_filter() {
    let f = fixture();
    let perm = Permission::Staff | Permission::owner("editor");
    assert!(perm.filter(&f.staff, f.entries.clone()).is_err());
    assert!(perm.filter(&f.anonymous, f.entries.clone()).is_err());
}

#[test]
fn stranger_sees_nothing_through_owner_combinators() {
    let f = fixture();
    let stranger = user().build();
    let owned_and_staff = Permission::owner("author") & Permission::Staff;
    let owned_or_staff = Permission::owner("author") | Permission::Staff;
    assert_eq!(f.visible(&owned_and_staff, &stranger), 0);
    assert_eq!(f.visible(&owned_or_staff, &stranger), 0);
}

/// Identity that still carries its user id after the session has lapsed.
struct ExpiredSession(Uuid);

impl Identity for ExpiredSession {
    fn subject_id(&self) -> Option<Uuid> {
        Some(self.0)
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_staff(&self) -> bool {
        false
    }

    fn is_superuser(&self) -> bool {
        false
    }

    fn has_capability(&self, _: &Capability) -> bool {
        false
    }
}

#[test]
fn expired_session_owns_nothing() {
    let f = fixture();
    let expired = ExpiredSession(f.owner.subject_id().unwrap());
    let owned = Some(f.owned() as &dyn Record);

    let perm = Permission::owner("author");
    assert!(!perm.check(&expired, Some(&entry_type()), owned));
    assert_eq!(perm.filter(&expired, f.entries.clone()).unwrap().count(), 0);

    let not_owned = !Permission::owner("author");
    assert!(not_owned.check(&expired, Some(&entry_type()), owned));
    assert_eq!(not_owned.filter(&expired, f.entries.clone()).unwrap().count(), 4);

    assert!(!Permission::Authenticated.check(&expired, None, None));
}
