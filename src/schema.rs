diesel::table! {
    accounts (id) {
        id -> Integer,
        username -> Text,
        password_hash -> Text,
        display_name -> Text,
        email -> Nullable<Text>,
        role -> Text,
        sector -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    tickets (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        origin_sector -> Text,
        priority -> Text,
        status -> Text,
        requester_id -> Integer,
        requester_name -> Text,
        technician_id -> Nullable<Integer>,
        technician_name -> Nullable<Text>,
        notes -> Nullable<Text>,
        resolution -> Nullable<Text>,
        opened_at -> Timestamp,
        assigned_at -> Nullable<Timestamp>,
        resolved_at -> Nullable<Timestamp>,
        sla_deadline -> Nullable<Timestamp>,
        attachments -> Nullable<Text>,
    }
}

diesel::table! {
    ticket_history (id) {
        id -> Integer,
        ticket_id -> Integer,
        user_id -> Integer,
        user_name -> Text,
        action -> Text,
        details -> Nullable<Text>,
        recorded_at -> Timestamp,
    }
}

diesel::table! {
    chat_messages (id) {
        id -> Integer,
        ticket_id -> Integer,
        user_id -> Integer,
        username -> Text,
        body -> Text,
        sent_at -> Timestamp,
    }
}

diesel::table! {
    audit_log (id) {
        id -> Integer,
        user_id -> Integer,
        action -> Text,
        details -> Nullable<Text>,
        recorded_at -> Timestamp,
    }
}

diesel::table! {
    feedback (id) {
        id -> Integer,
        user_id -> Integer,
        body -> Text,
        sent_at -> Timestamp,
    }
}

diesel::joinable!(tickets -> accounts (requester_id));
diesel::joinable!(ticket_history -> tickets (ticket_id));
diesel::joinable!(chat_messages -> tickets (ticket_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    tickets,
    ticket_history,
    chat_messages,
    audit_log,
    feedback,
);
