diesel::table! {
    weather (id) {
        id -> Text,
        city -> Text,
        temperature -> Double,
        description -> Nullable<Text>,
        humidity -> Nullable<Double>,
        pressure -> Nullable<Double>,
        wind_speed -> Nullable<Double>,
        wind_direction -> Nullable<Double>,
        created_at -> Text,
    }
}

diesel::table! {
    locations (id) {
        id -> Text,
        city -> Text,
        country -> Text,
        latitude -> Double,
        longitude -> Double,
        created_at -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Text,
        oauth_id -> Text,
        username -> Text,
        email -> Nullable<Text>,
        created_at -> Text,
    }
}
