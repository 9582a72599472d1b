use async_trait::async_trait;
use portal_framework::{ActorEntity, Filter, FrameworkError, ResourceActor};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Badge {
    id: u32,
    holder: String,
    level: u8,
}

#[derive(Debug)]
struct BadgeCreate {
    holder: String,
}

#[derive(Debug)]
struct BadgeUpdate {
    holder: Option<String>,
}

#[derive(Debug)]
enum BadgeAction {
    LevelUp,
}

#[derive(Debug, thiserror::Error)]
#[error("Badge holder must not be empty")]
struct BadgeError;

#[async_trait]
impl ActorEntity for Badge {
    type Id = u32;
    type Create = BadgeCreate;
    type Update = BadgeUpdate;
    type Action = BadgeAction;
    type ActionResult = u8;
    type Context = ();
    type Error = BadgeError;

    fn from_create_params(id: u32, params: BadgeCreate) -> Result<Self, Self::Error> {
        if params.holder.is_empty() {
            return Err(BadgeError);
        }
        Ok(Self {
            id,
            holder: params.holder,
            level: 1,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.holder.clone())
    }

    async fn on_update(
        &mut self,
        update: BadgeUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(holder) = update.holder {
            self.holder = holder;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: BadgeAction,
        _ctx: &Self::Context,
    ) -> Result<u8, Self::Error> {
        match action {
            BadgeAction::LevelUp => {
                self.level += 1;
                Ok(self.level)
            }
        }
    }
}

fn counter() -> impl Fn() -> u32 + Send + Sync + 'static {
    let next = Arc::new(AtomicU32::new(1));
    move || next.fetch_add(1, Ordering::SeqCst)
}

// --- Tests ---

#[tokio::test]
async fn test_framework_full_lifecycle() {
    let (actor, client) = ResourceActor::<Badge>::new(10, counter());
    tokio::spawn(actor.run(()));

    // 1. Create
    let id = client
        .create(BadgeCreate {
            holder: "alice".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, 1);

    // 2. Action
    let level = client.perform_action(id, BadgeAction::LevelUp).await.unwrap();
    assert_eq!(level, 2);

    // 3. Update
    let updated = client
        .update(
            id,
            BadgeUpdate {
                holder: Some("alicia".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.holder, "alicia");
    assert_eq!(updated.level, 2);

    // 4. Delete
    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unique_key_conflict_rejects_second_create() {
    let (actor, client) = ResourceActor::<Badge>::new(10, counter());
    tokio::spawn(actor.run(()));

    client
        .create(BadgeCreate {
            holder: "bob".into(),
        })
        .await
        .unwrap();

    let second = client
        .create(BadgeCreate {
            holder: "bob".into(),
        })
        .await;
    assert!(matches!(second, Err(FrameworkError::Conflict(key)) if key == "bob"));

    let all = client.list(Filter::all()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_find_and_list_use_filters() {
    let (actor, client) = ResourceActor::<Badge>::new(10, counter());
    tokio::spawn(actor.run(()));

    for holder in ["carol", "dave", "erin"] {
        client
            .create(BadgeCreate {
                holder: holder.into(),
            })
            .await
            .unwrap();
    }

    let dave = client
        .find(Filter::new(|b: &Badge| b.holder == "dave"))
        .await
        .unwrap()
        .expect("dave should exist");
    assert_eq!(dave.level, 1);

    let missing = client
        .find(Filter::new(|b: &Badge| b.holder == "zed"))
        .await
        .unwrap();
    assert!(missing.is_none());

    let mut not_dave: Vec<String> = client
        .list(Filter::new(|b: &Badge| b.holder != "dave"))
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.holder)
        .collect();
    not_dave.sort();
    assert_eq!(not_dave, vec!["carol".to_string(), "erin".to_string()]);
}

#[tokio::test]
async fn test_entity_error_is_boxed_and_downcastable() {
    let (actor, client) = ResourceActor::<Badge>::new(10, counter());
    tokio::spawn(actor.run(()));

    let err = client
        .create(BadgeCreate {
            holder: String::new(),
        })
        .await
        .unwrap_err();
    assert!(err.entity_error::<BadgeError>().is_some());
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let (actor, client) = ResourceActor::<Badge>::new(10, counter());
    tokio::spawn(actor.run(()));

    let result = client.update(42, BadgeUpdate { holder: None }).await;
    assert!(matches!(result, Err(FrameworkError::NotFound(id)) if id == "42"));
}
