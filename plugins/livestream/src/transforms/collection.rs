use crate::bus::ItemSpec;
use crate::livestream_api::Event;
use crate::resource::{Meta, Relationships, Resource, ResourceType};
use crate::transforms::{images::logo_images, resource_id_for_spec, video::first_of};

/// Maps an event to a composite resource (collection, series or season) linking `relationships`.
///
/// Images already attached to the spec come first, followed by the event logo.
pub fn collection_transform(
    spec: &ItemSpec,
    event: &Event,
    kind: ResourceType,
    relationships: Relationships,
) -> Resource {
    let mut images = spec.images.clone();
    if let Some(logo) = &event.logo {
        images.extend(logo_images(logo));
    }

    Resource {
        id: resource_id_for_spec(&spec.id),
        kind,
        title: first_of([&event.full_name, &event.short_name]),
        description: event.description.clone().unwrap_or_default(),
        images,
        sources: Vec::new(),
        duration: 0,
        genres: Vec::new(),
        tags: event.tags.clone(),
        cast: Vec::new(),
        release_date: event.start_time.clone().or_else(|| event.created_at.clone()),
        is_live: None,
        relationships: Some(relationships),
        meta: Meta { max_age: 0 },
    }
}
