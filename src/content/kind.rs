use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::auth::guard::{AuthPolicy, SUPER_ADMIN_ONLY};
use crate::filter::{FilterOrderInfo, SortDirection};

/// Every manageable content type. The route segment doubles as the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Services,
    Solutions,
    Resources,
    TeamMembers,
    Faqs,
    About,
    Settings,
    ProductFeatures,
    HomepageSteps,
}

impl ContentKind {
    pub const ALL: [ContentKind; 9] = [
        ContentKind::Services,
        ContentKind::Solutions,
        ContentKind::Resources,
        ContentKind::TeamMembers,
        ContentKind::Faqs,
        ContentKind::About,
        ContentKind::Settings,
        ContentKind::ProductFeatures,
        ContentKind::HomepageSteps,
    ];

    pub fn spec(&self) -> &'static ContentSpec {
        match self {
            ContentKind::Services => &SERVICES,
            ContentKind::Solutions => &SOLUTIONS,
            ContentKind::Resources => &RESOURCES,
            ContentKind::TeamMembers => &TEAM_MEMBERS,
            ContentKind::Faqs => &FAQS,
            ContentKind::About => &ABOUT,
            ContentKind::Settings => &SETTINGS,
            ContentKind::ProductFeatures => &PRODUCT_FEATURES,
            ContentKind::HomepageSteps => &HOMEPAGE_STEPS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.spec().route
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown content type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.spec().route == s || kind.spec().table == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// How a row is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// Store-assigned UUID in `id`.
    Id,
    /// Caller-chosen natural key; updates become upserts.
    Natural(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Bool,
    Int,
    Timestamp,
    JsonArray,
    JsonObject,
    Json,
}

impl FieldType {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Text => "a string",
            FieldType::Bool => "a boolean",
            FieldType::Int => "an integer",
            FieldType::Timestamp => "an RFC 3339 timestamp",
            FieldType::JsonArray => "a JSON array",
            FieldType::JsonObject => "a JSON object",
            FieldType::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

const fn text(name: &'static str) -> FieldDef {
    FieldDef { name, ty: FieldType::Text, required: false }
}

const fn required(name: &'static str) -> FieldDef {
    FieldDef { name, ty: FieldType::Text, required: true }
}

const fn typed(name: &'static str, ty: FieldType) -> FieldDef {
    FieldDef { name, ty, required: false }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

const fn asc(column: &'static str) -> OrderSpec {
    OrderSpec { column, direction: SortDirection::Asc }
}

const fn desc(column: &'static str) -> OrderSpec {
    OrderSpec { column, direction: SortDirection::Desc }
}

/// Column that receives `max + 1` on create, optionally counted per value of `scope`.
#[derive(Debug, Clone, Copy)]
pub struct AutoOrder {
    pub column: &'static str,
    pub scope: Option<&'static str>,
}

/// Static descriptor driving the generic content actions for one type.
#[derive(Debug)]
pub struct ContentSpec {
    pub kind: ContentKind,
    pub table: &'static str,
    pub route: &'static str,
    pub key: KeyStyle,
    pub slug: bool,
    pub publication: Option<&'static str>,
    pub auto_order: Option<AutoOrder>,
    pub admin_order: &'static [OrderSpec],
    pub public_order: &'static [OrderSpec],
    pub policy: AuthPolicy,
    /// Public pages rendering this type; `{slug}` is substituted when known.
    pub public_routes: &'static [&'static str],
    /// Invalidate the whole layout rather than single pages.
    pub layout: bool,
    /// Columns accepted as equality filters on list calls.
    pub filterable: &'static [&'static str],
    pub fields: &'static [FieldDef],
}

impl ContentSpec {
    pub fn key_column(&self) -> &'static str {
        match self.key {
            KeyStyle::Id => "id",
            KeyStyle::Natural(column) => column,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn admin_route(&self) -> String {
        format!("/admin/{}", self.route)
    }

    pub fn order_for(&self, public: bool) -> Vec<FilterOrderInfo> {
        let order = if public { self.public_order } else { self.admin_order };
        order
            .iter()
            .map(|o| FilterOrderInfo { column: o.column.to_string(), sort: o.direction })
            .collect()
    }
}

static SERVICES: ContentSpec = ContentSpec {
    kind: ContentKind::Services,
    table: "services",
    route: "services",
    key: KeyStyle::Id,
    slug: true,
    publication: Some("is_published"),
    auto_order: None,
    admin_order: &[asc("sort_order")],
    public_order: &[asc("sort_order")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/", "/services", "/services/{slug}"],
    layout: false,
    filterable: &[],
    fields: &[
        required("title"),
        text("slug"),
        text("short_description"),
        text("description"),
        text("icon"),
        text("image_url"),
        typed("features", FieldType::JsonArray),
        typed("benefits", FieldType::JsonArray),
        typed("faqs", FieldType::JsonArray),
        typed("is_published", FieldType::Bool),
        typed("sort_order", FieldType::Int),
    ],
};

static SOLUTIONS: ContentSpec = ContentSpec {
    kind: ContentKind::Solutions,
    table: "solutions",
    route: "solutions",
    key: KeyStyle::Id,
    slug: true,
    publication: Some("is_published"),
    auto_order: None,
    admin_order: &[asc("sort_order")],
    public_order: &[asc("sort_order")],
    policy: AuthPolicy::Authenticated,
    public_routes: &["/", "/solutions", "/solutions/{slug}"],
    layout: false,
    filterable: &["industry"],
    fields: &[
        required("title"),
        text("slug"),
        text("subtitle"),
        text("description"),
        text("industry"),
        text("icon"),
        text("image_url"),
        typed("challenges", FieldType::JsonArray),
        typed("features", FieldType::JsonArray),
        typed("benefits", FieldType::JsonArray),
        typed("stats", FieldType::JsonArray),
        typed("is_published", FieldType::Bool),
        typed("sort_order", FieldType::Int),
    ],
};

static RESOURCES: ContentSpec = ContentSpec {
    kind: ContentKind::Resources,
    table: "resources",
    route: "resources",
    key: KeyStyle::Id,
    slug: true,
    publication: Some("is_published"),
    auto_order: None,
    admin_order: &[desc("created_at")],
    public_order: &[desc("created_at")],
    policy: AuthPolicy::Authenticated,
    public_routes: &["/resources", "/resources/{slug}"],
    layout: false,
    filterable: &["resource_type"],
    fields: &[
        required("title"),
        text("slug"),
        text("resource_type"),
        text("summary"),
        typed("content", FieldType::JsonArray),
        text("author"),
        text("cover_image_url"),
        text("file_url"),
        typed("tags", FieldType::JsonArray),
        typed("is_published", FieldType::Bool),
        typed("published_at", FieldType::Timestamp),
    ],
};

static TEAM_MEMBERS: ContentSpec = ContentSpec {
    kind: ContentKind::TeamMembers,
    table: "team_members",
    route: "team-members",
    key: KeyStyle::Id,
    slug: false,
    publication: None,
    auto_order: Some(AutoOrder { column: "display_order", scope: None }),
    admin_order: &[asc("display_order")],
    public_order: &[asc("display_order")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/company"],
    layout: false,
    filterable: &[],
    fields: &[
        required("name"),
        required("position"),
        text("bio"),
        text("photo_url"),
        text("linkedin_url"),
        text("email"),
        typed("display_order", FieldType::Int),
    ],
};

static FAQS: ContentSpec = ContentSpec {
    kind: ContentKind::Faqs,
    table: "faqs",
    route: "faqs",
    key: KeyStyle::Id,
    slug: false,
    publication: Some("is_published"),
    auto_order: Some(AutoOrder { column: "display_order", scope: None }),
    admin_order: &[asc("display_order")],
    public_order: &[asc("display_order")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/faq", "/contact"],
    layout: false,
    filterable: &["category"],
    fields: &[
        required("question"),
        required("answer"),
        text("category"),
        typed("display_order", FieldType::Int),
        typed("is_published", FieldType::Bool),
    ],
};

static ABOUT: ContentSpec = ContentSpec {
    kind: ContentKind::About,
    table: "about_content",
    route: "about",
    key: KeyStyle::Natural("section_key"),
    slug: false,
    publication: None,
    auto_order: None,
    admin_order: &[asc("created_at")],
    public_order: &[asc("created_at")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/company"],
    layout: false,
    filterable: &[],
    fields: &[
        required("section_key"),
        text("title"),
        text("subtitle"),
        typed("content", FieldType::Json),
        text("image_url"),
    ],
};

static SETTINGS: ContentSpec = ContentSpec {
    kind: ContentKind::Settings,
    table: "site_settings",
    route: "settings",
    key: KeyStyle::Natural("key"),
    slug: false,
    publication: None,
    auto_order: None,
    admin_order: &[asc("key")],
    public_order: &[asc("key")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/"],
    layout: true,
    filterable: &[],
    fields: &[
        required("key"),
        typed("value", FieldType::Json),
        text("description"),
    ],
};

static PRODUCT_FEATURES: ContentSpec = ContentSpec {
    kind: ContentKind::ProductFeatures,
    table: "product_features",
    route: "product-features",
    key: KeyStyle::Id,
    slug: false,
    publication: None,
    auto_order: Some(AutoOrder { column: "display_order", scope: Some("product") }),
    admin_order: &[asc("display_order")],
    public_order: &[asc("display_order")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/products"],
    layout: false,
    filterable: &["product"],
    fields: &[
        required("product"),
        required("title"),
        text("description"),
        text("icon"),
        typed("display_order", FieldType::Int),
    ],
};

static HOMEPAGE_STEPS: ContentSpec = ContentSpec {
    kind: ContentKind::HomepageSteps,
    table: "homepage_steps",
    route: "homepage-steps",
    key: KeyStyle::Id,
    slug: false,
    publication: None,
    auto_order: Some(AutoOrder { column: "display_order", scope: None }),
    admin_order: &[asc("display_order")],
    public_order: &[asc("display_order")],
    policy: SUPER_ADMIN_ONLY,
    public_routes: &["/"],
    layout: false,
    filterable: &[],
    fields: &[
        required("title"),
        text("description"),
        text("icon"),
        typed("display_order", FieldType::Int),
    ],
};
