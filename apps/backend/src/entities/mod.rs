pub mod answer_cards;
pub mod decks;
pub mod game_decks;
pub mod games;
pub mod hand_cards;
pub mod pick_cards;
pub mod players;
pub mod prompt_cards;
pub mod round_picks;
pub mod rounds;

pub use answer_cards::Entity as AnswerCards;
pub use answer_cards::Model as AnswerCard;
pub use decks::Entity as Decks;
pub use decks::Model as Deck;
pub use games::Entity as Games;
pub use games::Model as Game;
pub use hand_cards::Entity as HandCards;
pub use hand_cards::Model as HandCard;
pub use pick_cards::Entity as PickCards;
pub use pick_cards::Model as PickCard;
pub use players::Entity as Players;
pub use players::Model as Player;
pub use prompt_cards::Entity as PromptCards;
pub use prompt_cards::Model as PromptCard;
pub use round_picks::Entity as RoundPicks;
pub use round_picks::Model as RoundPick;
pub use rounds::Entity as Rounds;
pub use rounds::Model as Round;
