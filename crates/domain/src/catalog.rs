use cmms_core::{AppError, AppResult};

use crate::column::{ColumnDescriptor, ColumnRender};
use crate::entity::{EntityBinding, EntityBindingInput, EntityBindingKind};
use crate::field::{
    CascadingSelect, DependsOn, FieldDescriptor, FieldKind, OptionLabel, RemoteOptions, ResolveTo,
    SelectOptions,
};
use crate::form::FormSchema;

/// Static set of entity bindings exposed by the campus application.
#[derive(Debug, Clone)]
pub struct EntityCatalog {
    bindings: Vec<EntityBinding>,
}

impl EntityCatalog {
    /// Creates a catalog, rejecting duplicate collection names.
    pub fn new(bindings: Vec<EntityBinding>) -> AppResult<Self> {
        for (index, binding) in bindings.iter().enumerate() {
            if bindings[..index]
                .iter()
                .any(|earlier| earlier.collection() == binding.collection())
            {
                return Err(AppError::Validation(format!(
                    "duplicate collection '{}' in catalog",
                    binding.collection()
                )));
            }
        }

        Ok(Self { bindings })
    }

    /// Builds the campus maintenance catalog.
    pub fn campus() -> AppResult<Self> {
        Self::new(vec![
            persons()?,
            schools()?,
            locations()?,
            activities()?,
            maintenance()?,
            participations()?,
            affiliations()?,
        ])
    }

    /// Returns all bindings in navigation order.
    #[must_use]
    pub fn bindings(&self) -> &[EntityBinding] {
        &self.bindings
    }

    /// Looks up a binding by collection name.
    #[must_use]
    pub fn get(&self, collection: &str) -> Option<&EntityBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.collection() == collection)
    }

    /// Looks up a binding, failing with `NotFound` for unknown collections.
    pub fn require(&self, collection: &str) -> AppResult<&EntityBinding> {
        self.get(collection)
            .ok_or_else(|| AppError::NotFound(format!("unknown entity '{collection}'")))
    }
}

fn columns(pairs: &[(&str, &str)]) -> AppResult<Vec<ColumnDescriptor>> {
    pairs
        .iter()
        .map(|(key, label)| ColumnDescriptor::new(*key, *label))
        .collect()
}

fn building_field() -> AppResult<FieldDescriptor> {
    let source = RemoteOptions::new(
        "locations",
        "building",
        OptionLabel::Key("building".to_owned()),
    )?;

    FieldDescriptor::new(
        "building",
        "Building",
        FieldKind::CascadingSelect(CascadingSelect::new(source).unique()),
    )
}

fn room_field(resolve_into: &str) -> AppResult<FieldDescriptor> {
    let source = RemoteOptions::new(
        "locations",
        "room",
        OptionLabel::Template("Room {room} (Floor {floor})".to_owned()),
    )?;
    let cascading = CascadingSelect::new(source)
        .depends_on(DependsOn::new("building", "building")?)
        .resolve_to(ResolveTo::new(resolve_into, "location_id")?);

    FieldDescriptor::new("room", "Room", FieldKind::CascadingSelect(cascading))
}

fn person_select(name: &str, label: &str) -> AppResult<FieldDescriptor> {
    FieldDescriptor::new(
        name,
        label,
        FieldKind::Select {
            options: SelectOptions::Remote(RemoteOptions::new(
                "persons",
                "personal_id",
                OptionLabel::Template("{name} ({personal_id})".to_owned()),
            )?),
        },
    )
}

fn persons() -> AppResult<EntityBinding> {
    EntityBinding::new(EntityBindingInput {
        collection: "persons".to_owned(),
        title: "Person Management".to_owned(),
        display_name: "Person".to_owned(),
        id_field: "personal_id".to_owned(),
        columns: columns(&[
            ("personal_id", "ID"),
            ("name", "Name"),
            ("age", "Age"),
            ("gender", "Gender"),
            ("supervisor_id", "Supervisor"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::text("personal_id", "Personal ID")?.required(),
            FieldDescriptor::text("name", "Name")?.required(),
            FieldDescriptor::new("age", "Age", FieldKind::Number)?,
            FieldDescriptor::new(
                "gender",
                "Gender",
                FieldKind::Select {
                    options: SelectOptions::labels(["Male", "Female", "Other"])?,
                },
            )?,
            FieldDescriptor::new("date_of_birth", "Date of Birth", FieldKind::Date)?,
            person_select("supervisor_id", "Supervisor")?,
        ])?,
        kind: EntityBindingKind::Managed,
    })
}

fn schools() -> AppResult<EntityBinding> {
    EntityBinding::new(EntityBindingInput {
        collection: "schools".to_owned(),
        title: "School Management".to_owned(),
        display_name: "School".to_owned(),
        id_field: "school_name".to_owned(),
        columns: columns(&[
            ("school_name", "School Name"),
            ("department", "Department"),
            ("faculty", "Faculty"),
            ("building", "HQ Building"),
            ("room", "HQ Room"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::text("school_name", "School Name")?.required(),
            FieldDescriptor::text("department", "Department")?.required(),
            FieldDescriptor::text("faculty", "Faculty")?,
            building_field()?,
            room_field("hq_location_id")?,
        ])?,
        kind: EntityBindingKind::Managed,
    })
}

fn locations() -> AppResult<EntityBinding> {
    let building_suggestions = RemoteOptions::new(
        "locations",
        "building",
        OptionLabel::Key("building".to_owned()),
    )?;

    EntityBinding::new(EntityBindingInput {
        collection: "locations".to_owned(),
        title: "Location Management".to_owned(),
        display_name: "Location".to_owned(),
        id_field: "location_id".to_owned(),
        columns: columns(&[
            ("location_id", "ID"),
            ("building", "Building"),
            ("floor", "Floor"),
            ("room", "Room"),
            ("type", "Type"),
            ("campus", "Campus"),
            ("school_name", "School"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::new(
                "building",
                "Building",
                FieldKind::CascadingSelect(
                    CascadingSelect::new(building_suggestions)
                        .unique()
                        .allow_new(),
                ),
            )?
            .required(),
            FieldDescriptor::text("floor", "Floor")?,
            FieldDescriptor::text("room", "Room")?.required(),
            FieldDescriptor::new(
                "type",
                "Type",
                FieldKind::Select {
                    options: SelectOptions::labels([
                        "Classroom",
                        "Office",
                        "Laboratory",
                        "Lecture Hall",
                        "Common Area",
                    ])?,
                },
            )?,
            FieldDescriptor::text("campus", "Campus")?,
            FieldDescriptor::new(
                "school_name",
                "School",
                FieldKind::Select {
                    options: SelectOptions::Remote(RemoteOptions::new(
                        "schools",
                        "school_name",
                        OptionLabel::Key("school_name".to_owned()),
                    )?),
                },
            )?,
        ])?,
        kind: EntityBindingKind::Managed,
    })
}

fn activities() -> AppResult<EntityBinding> {
    EntityBinding::new(EntityBindingInput {
        collection: "activities".to_owned(),
        title: "Activity Management".to_owned(),
        display_name: "Activity".to_owned(),
        id_field: "activity_id".to_owned(),
        columns: columns(&[
            ("activity_id", "ID"),
            ("type", "Type"),
            ("time", "Time"),
            ("organiser_name", "Organiser"),
            ("building", "Building"),
            ("room", "Room"),
            ("floor", "Floor"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::text("activity_id", "Activity ID")?.required(),
            FieldDescriptor::text("type", "Type")?,
            FieldDescriptor::new("time", "Time", FieldKind::DateTime)?,
            person_select("organiser_id", "Organiser")?.required(),
            building_field()?,
            room_field("location_id")?,
        ])?,
        kind: EntityBindingKind::Managed,
    })
}

fn maintenance() -> AppResult<EntityBinding> {
    let mut table_columns = columns(&[
        ("type", "Type"),
        ("frequency", "Frequency"),
        ("building", "Building"),
        ("room", "Room"),
    ])?;
    table_columns.push(
        ColumnDescriptor::new("active_chemical", "Active Chemical")?
            .with_render(ColumnRender::YesNo),
    );

    EntityBinding::new(EntityBindingInput {
        collection: "maintenance".to_owned(),
        title: "Maintenance Management".to_owned(),
        display_name: "Maintenance".to_owned(),
        id_field: "maintenance_id".to_owned(),
        columns: table_columns,
        form: FormSchema::new(vec![
            FieldDescriptor::text("type", "Type")?.required(),
            FieldDescriptor::text("frequency", "Frequency")?,
            building_field()?.required(),
            room_field("location_id")?.required(),
            FieldDescriptor::new(
                "active_chemical",
                "Active Chemical",
                FieldKind::Select {
                    options: SelectOptions::yes_no()?,
                },
            )?,
        ])?,
        kind: EntityBindingKind::Managed,
    })
}

fn participations() -> AppResult<EntityBinding> {
    EntityBinding::new(EntityBindingInput {
        collection: "participations".to_owned(),
        title: "Participations".to_owned(),
        display_name: "Participation".to_owned(),
        id_field: "personal_id".to_owned(),
        columns: columns(&[
            ("person_name", "Person"),
            ("activity_type", "Activity"),
            ("activity_time", "Time"),
            ("building", "Building"),
            ("room", "Room"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::text("personal_id", "Personal ID")?.required(),
            FieldDescriptor::text("activity_id", "Activity ID")?.required(),
        ])?,
        kind: EntityBindingKind::Relationship,
    })
}

fn affiliations() -> AppResult<EntityBinding> {
    EntityBinding::new(EntityBindingInput {
        collection: "affiliations".to_owned(),
        title: "Affiliations".to_owned(),
        display_name: "Affiliation".to_owned(),
        id_field: "personal_id".to_owned(),
        columns: columns(&[
            ("person_name", "Person"),
            ("school_name", "School"),
            ("department", "Department"),
        ])?,
        form: FormSchema::new(vec![
            FieldDescriptor::text("personal_id", "Personal ID")?.required(),
            FieldDescriptor::text("school_name", "School Name")?.required(),
        ])?,
        kind: EntityBindingKind::Relationship,
    })
}
