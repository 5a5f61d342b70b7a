pub mod slot_store;
pub mod supabase;

pub use slot_store::{SlotStore, StoreError, SupabaseSlotStore};
pub use supabase::SupabaseClient;
