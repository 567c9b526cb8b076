//! External domain metadata and initial domain mapping generators
//!
//! Pure data consumed by DevRev's schema reconciliation. The metadata
//! describes the `cards` and `users` record types; the initial mapping
//! wires those record types onto stock DevRev objects (`issue`, `devu`)
//! with forward-only field mappings.

use serde_json::{json, Value};

/// Schema version understood by the reconciliation tooling
pub const SCHEMA_VERSION: &str = "v0.2.0";

/// Generate the external domain metadata document
pub fn external_domain_metadata() -> Value {
    json!({
        "schema_version": SCHEMA_VERSION,
        "record_types": {
            "cards": {
                "name": "Cards",
                "description": "Cards extracted from Trello boards",
                "fields": {
                    "name": {
                        "name": "Name",
                        "type": "text",
                        "is_required": true
                    },
                    "url": {
                        "name": "URL",
                        "type": "text",
                        "is_required": true
                    },
                    "description": {
                        "name": "Description",
                        "type": "rich_text",
                        "is_required": true
                    },
                    "id_members": {
                        "name": "ID Members",
                        "type": "reference",
                        "is_required": true,
                        "collection": {
                            "max_length": 50
                        },
                        "reference": {
                            "refers_to": {
                                "#record:users": {}
                            }
                        }
                    },
                    "created_by": {
                        "name": "Created By",
                        "type": "reference",
                        "is_required": true,
                        "reference": {
                            "refers_to": {
                                "#record:users": {}
                            }
                        }
                    }
                }
            },
            "users": {
                "name": "Users",
                "description": "Members of the Trello organization",
                "fields": {
                    "full_name": {
                        "name": "Full Name",
                        "type": "text",
                        "is_required": true
                    },
                    "username": {
                        "name": "Username",
                        "type": "text",
                        "is_required": true
                    }
                }
            }
        }
    })
}

/// Generate the initial domain mapping document
pub fn initial_domain_mapping() -> Value {
    json!({
        "additional_mappings": {
            "record_type_mappings": {
                "users": {
                    "default_mapping": {
                        "object_category": "stock",
                        "object_type": "devu"
                    },
                    "possible_record_type_mappings": [
                        {
                            "devrev_leaf_type": "devu",
                            "forward": true,
                            "reverse": false,
                            "shard": {
                                "mode": "create_shard",
                                "devrev_leaf_type": {
                                    "object_category": "stock",
                                    "object_type": "devu"
                                },
                                "stock_field_mappings": {
                                    "full_name": direct_mapping("full_name"),
                                    "display_name": direct_mapping("username")
                                }
                            }
                        }
                    ]
                },
                "cards": {
                    "default_mapping": {
                        "object_category": "stock",
                        "object_type": "issue"
                    },
                    "possible_record_type_mappings": [
                        {
                            "devrev_leaf_type": "issue",
                            "forward": true,
                            "reverse": false,
                            "shard": {
                                "mode": "create_shard",
                                "devrev_leaf_type": {
                                    "object_category": "stock",
                                    "object_type": "issue"
                                },
                                "stock_field_mappings": {
                                    "title": direct_mapping("name"),
                                    "item_url_field": direct_mapping("url"),
                                    "body": rich_text_mapping("description"),
                                    "owned_by_ids": direct_mapping("id_members"),
                                    "created_by_id": direct_mapping("created_by"),
                                    "priority": fixed_enum_mapping("P2"),
                                    "stage": fixed_enum_mapping("triage"),
                                    "applies_to_part_id": devrev_record_mapping("product")
                                }
                            }
                        }
                    ]
                }
            }
        }
    })
}

fn direct_mapping(external_field: &str) -> Value {
    json!({
        "forward": true,
        "reverse": false,
        "primary_external_field": external_field,
        "transformation_method_for_set": {
            "transformation_method": "use_directly"
        }
    })
}

fn rich_text_mapping(external_field: &str) -> Value {
    json!({
        "forward": true,
        "reverse": false,
        "primary_external_field": external_field,
        "transformation_method_for_set": {
            "transformation_method": "use_rich_text"
        }
    })
}

fn fixed_enum_mapping(value: &str) -> Value {
    json!({
        "forward": true,
        "reverse": false,
        "transformation_method_for_set": {
            "transformation_method": "use_fixed_value",
            "value": "enum_value",
            "enum": value
        }
    })
}

fn devrev_record_mapping(object_type: &str) -> Value {
    json!({
        "forward": true,
        "reverse": false,
        "transformation_method_for_set": {
            "transformation_method": "use_devrev_record",
            "leaf_type": {
                "object_category": "stock",
                "object_type": object_type
            }
        }
    })
}
