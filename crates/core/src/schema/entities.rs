use super::{Display, EntityKind, FieldKind, FieldSpec, OrderBy, Schema, ORDER_INDEX};

const TITLE: FieldKind = FieldKind::Localized { min_len: 2 };
const DESCRIPTION: FieldKind = FieldKind::Localized { min_len: 10 };
const ORDER: FieldKind = FieldKind::Integer { min: 0, max: None };

const NEWEST_FIRST: OrderBy = OrderBy {
    column: "created_at",
    ascending: false,
};

const BY_ORDER_INDEX: OrderBy = OrderBy {
    column: ORDER_INDEX,
    ascending: true,
};

pub(super) static PRODUCT: Schema = Schema {
    kind: EntityKind::Product,
    table: "products",
    slug: "products",
    label: "Product",
    fields: &[
        FieldSpec::required("name", TITLE),
        FieldSpec::required("description", DESCRIPTION),
        FieldSpec::optional("category", FieldKind::Text { min_len: 2 }),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::optional("is_featured", FieldKind::Bool),
    ],
    order: NEWEST_FIRST,
    visibility: None,
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "name",
        summary: Some("description"),
        body: None,
        lists: &[],
        icon: None,
        route: Some("/products"),
    },
};

pub(super) static RECIPE: Schema = Schema {
    kind: EntityKind::Recipe,
    table: "recipes",
    slug: "recipes",
    label: "Recipe",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::required("description", DESCRIPTION),
        FieldSpec::required("ingredients", FieldKind::LocalizedList),
        FieldSpec::required("preparation_steps", FieldKind::LocalizedList),
        FieldSpec::optional("prep_time_minutes", FieldKind::Integer { min: 0, max: None }),
        FieldSpec::optional("servings", FieldKind::Integer { min: 1, max: Some(100) }),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::optional("show_in_gallery", FieldKind::Bool),
    ],
    order: NEWEST_FIRST,
    visibility: Some("show_in_gallery"),
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("description"),
        body: None,
        lists: &["ingredients", "preparation_steps"],
        icon: None,
        route: Some("/recipes"),
    },
};

pub(super) static BLOG_POST: Schema = Schema {
    kind: EntityKind::BlogPost,
    table: "blog_posts",
    slug: "blog",
    label: "Blog post",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::required("excerpt", DESCRIPTION),
        FieldSpec::required("content", DESCRIPTION),
        FieldSpec::optional("author", FieldKind::Text { min_len: 2 }),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::optional("published", FieldKind::Bool),
    ],
    order: NEWEST_FIRST,
    visibility: Some("published"),
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("excerpt"),
        body: Some("content"),
        lists: &[],
        icon: None,
        route: Some("/blog"),
    },
};

pub(super) static DISTRIBUTOR: Schema = Schema {
    kind: EntityKind::Distributor,
    table: "distributors",
    slug: "distributors",
    label: "Distributor",
    fields: &[
        FieldSpec::required("name", TITLE),
        FieldSpec::required("address", FieldKind::Localized { min_len: 5 }),
        FieldSpec::required("city", FieldKind::Text { min_len: 2 }),
        FieldSpec::optional("phone", FieldKind::Text { min_len: 6 }),
        FieldSpec::optional("email", FieldKind::Email),
        // Either a storefront photo or a map embed URL.
        FieldSpec::optional("image_url", FieldKind::Url),
    ],
    order: OrderBy {
        column: "name_en",
        ascending: true,
    },
    visibility: None,
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "name",
        summary: Some("address"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static FAQ_ITEM: Schema = Schema {
    kind: EntityKind::FaqItem,
    table: "faq_items",
    slug: "faq",
    label: "FAQ item",
    fields: &[
        FieldSpec::required("question", FieldKind::Localized { min_len: 5 }),
        FieldSpec::required("answer", DESCRIPTION),
        FieldSpec::required(ORDER_INDEX, ORDER),
    ],
    order: BY_ORDER_INDEX,
    visibility: None,
    image_field: None,
    single_active: None,
    singleton: false,
    display: Display {
        title: "question",
        summary: Some("answer"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static FACT: Schema = Schema {
    kind: EntityKind::Fact,
    table: "facts",
    slug: "facts",
    label: "Fact",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::required("description", DESCRIPTION),
        FieldSpec::required("icon", FieldKind::Icon),
        FieldSpec::required(ORDER_INDEX, ORDER),
    ],
    order: BY_ORDER_INDEX,
    visibility: None,
    image_field: None,
    single_active: None,
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("description"),
        body: None,
        lists: &[],
        icon: Some("icon"),
        route: None,
    },
};

pub(super) static FARM_INFO: Schema = Schema {
    kind: EntityKind::FarmInfo,
    table: "farm_info",
    slug: "farm-info",
    label: "Farm info item",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::required("description", DESCRIPTION),
        FieldSpec::required("icon", FieldKind::Icon),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::required(ORDER_INDEX, ORDER),
    ],
    order: BY_ORDER_INDEX,
    visibility: None,
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("description"),
        body: None,
        lists: &[],
        icon: Some("icon"),
        route: None,
    },
};

pub(super) static DISCOUNT: Schema = Schema {
    kind: EntityKind::Discount,
    table: "discounts",
    slug: "discounts",
    label: "Discount",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::required("description", DESCRIPTION),
        FieldSpec::required("percentage", FieldKind::Integer { min: 0, max: Some(100) }),
        FieldSpec::optional("code", FieldKind::Text { min_len: 3 }),
        FieldSpec::optional("image_url", FieldKind::Url),
    ],
    order: NEWEST_FIRST,
    visibility: Some("is_active"),
    image_field: Some("image_url"),
    single_active: Some("is_active"),
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("description"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static BANNER: Schema = Schema {
    kind: EntityKind::Banner,
    table: "banner_content",
    slug: "banners",
    label: "Banner",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::optional("subtitle", FieldKind::Localized { min_len: 2 }),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::optional("link_url", FieldKind::Url),
    ],
    order: NEWEST_FIRST,
    visibility: Some("is_active"),
    image_field: Some("image_url"),
    single_active: Some("is_active"),
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("subtitle"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static HERO_SLIDE: Schema = Schema {
    kind: EntityKind::HeroSlide,
    table: "hero_carousel",
    slug: "hero",
    label: "Hero slide",
    fields: &[
        FieldSpec::required("title", TITLE),
        FieldSpec::optional("subtitle", FieldKind::Localized { min_len: 2 }),
        FieldSpec::optional("image_url", FieldKind::Url),
        FieldSpec::optional("link_url", FieldKind::Url),
        FieldSpec::required(ORDER_INDEX, ORDER),
        FieldSpec::optional("is_active", FieldKind::Bool),
    ],
    order: BY_ORDER_INDEX,
    visibility: Some("is_active"),
    image_field: Some("image_url"),
    single_active: None,
    singleton: false,
    display: Display {
        title: "title",
        summary: Some("subtitle"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static SITE_SETTINGS: Schema = Schema {
    kind: EntityKind::SiteSettings,
    table: "site_settings",
    slug: "settings",
    label: "Site settings",
    fields: &[
        FieldSpec::required("site_name", FieldKind::Text { min_len: 2 }),
        FieldSpec::optional("tagline", FieldKind::Localized { min_len: 2 }),
        FieldSpec::optional("logo_url", FieldKind::Url),
        FieldSpec::optional("contact_email", FieldKind::Email),
        FieldSpec::optional("phone", FieldKind::Text { min_len: 6 }),
        FieldSpec::optional("address", FieldKind::Localized { min_len: 5 }),
        FieldSpec::optional("facebook_url", FieldKind::Url),
        FieldSpec::optional("instagram_url", FieldKind::Url),
    ],
    order: NEWEST_FIRST,
    visibility: None,
    image_field: Some("logo_url"),
    single_active: None,
    singleton: true,
    display: Display {
        title: "site_name",
        summary: Some("tagline"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};

pub(super) static ADMIN_USER: Schema = Schema {
    kind: EntityKind::AdminUser,
    table: "admin_users",
    slug: "users",
    label: "Admin user",
    fields: &[
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::required("full_name", FieldKind::Text { min_len: 2 }),
        FieldSpec::required("role", FieldKind::Text { min_len: 2 }),
    ],
    order: NEWEST_FIRST,
    visibility: None,
    image_field: None,
    single_active: None,
    singleton: false,
    display: Display {
        title: "full_name",
        summary: Some("email"),
        body: None,
        lists: &[],
        icon: None,
        route: None,
    },
};
