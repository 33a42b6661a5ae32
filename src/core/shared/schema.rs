diesel::table! {
    properties (id) {
        id -> Uuid,
        street -> Text,
        suburb -> Text,
        state -> Text,
        postcode -> Text,
        full_address -> Text,
        property_type -> Text,
        bedrooms -> Nullable<Int4>,
        bathrooms -> Nullable<Int4>,
        car_spaces -> Int4,
        land_size -> Nullable<Float8>,
        building_area -> Nullable<Float8>,
        year_built -> Nullable<Int4>,
        latitude -> Float8,
        longitude -> Float8,
        valuation -> Nullable<Jsonb>,
        market_history -> Jsonb,
        data_sources -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    property_owners (id) {
        id -> Uuid,
        first_name -> Text,
        last_name -> Text,
        full_name -> Text,
        email -> Nullable<Jsonb>,
        phone -> Nullable<Jsonb>,
        estimated_age -> Nullable<Int4>,
        occupation -> Nullable<Text>,
        household_income -> Nullable<Text>,
        ownership_type -> Nullable<Text>,
        prospect_segment -> Nullable<Jsonb>,
        interactions -> Jsonb,
        preferred_contact -> Nullable<Text>,
        do_not_contact -> Bool,
        tags -> Array<Text>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    property_ownerships (property_id, owner_id) {
        property_id -> Uuid,
        owner_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    action_items (id) {
        id -> Uuid,
        owner_id -> Uuid,
        property_id -> Uuid,
        action_type -> Text,
        priority -> Int4,
        scheduled_date -> Timestamptz,
        estimated_duration -> Nullable<Int4>,
        title -> Text,
        description -> Nullable<Text>,
        call_script -> Nullable<Text>,
        email_template -> Nullable<Text>,
        status -> Text,
        completed_at -> Nullable<Timestamptz>,
        result -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    analytics_snapshots (id) {
        id -> Uuid,
        date -> Date,
        metrics -> Jsonb,
        segment_performance -> Jsonb,
        properties_updated -> Int4,
        new_properties -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(property_ownerships -> properties (property_id));
diesel::joinable!(property_ownerships -> property_owners (owner_id));
diesel::joinable!(action_items -> properties (property_id));
diesel::joinable!(action_items -> property_owners (owner_id));

diesel::allow_tables_to_appear_in_same_query!(
    properties,
    property_owners,
    property_ownerships,
    action_items,
    analytics_snapshots,
);
