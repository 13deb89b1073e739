//! Templates shipped with the crate.

/// Shared button markup, registered as the `ld2hButton` partial.
pub const BUTTON_PARTIAL: &str = r#"<a class="mdc-button mdc-card__action mdc-card__action--button" href="{{target}}">{{#if icon}}{{{ld2hIcon icon}}}{{/if}}{{#if label}}<span class="mdc-button__label">{{label}}</span>{{/if}}</a>"#;

pub const DEFAULT_CARD: &str = r#"<div class="mdc-card ld2h-card" style="margin: 8px 0;">
{{#if ld2hImage}}<div class="mdc-card__media mdc-card__media--16-9" style="background-image: url(&quot;{{ld2hImage}}&quot;);"></div>
{{/if}}<div class="ld2h-card__content" style="padding: 16px;">{{{ld2hSubtemplateContent}}}</div>
{{#if ld2hButtons}}<div class="mdc-card__actions"><div class="mdc-card__action-buttons">{{#each ld2hButtons}}{{> ld2hButton}}{{/each}}</div></div>
{{/if}}</div>"#;

/// One tab button and one panel per reservation in the list.
pub const RESERVATIONS_CARD: &str = r#"<div class="mdc-card ld2h-card ld2h-tabs" style="margin: 8px 0;">
<div class="mdc-tab-bar" role="tablist"><div class="mdc-tab-scroller"><div class="mdc-tab-scroller__scroll-area"><div class="mdc-tab-scroller__scroll-content">
{{#each ld2hTabs}}<button class="mdc-tab{{#if @first}} mdc-tab--active{{/if}}" role="tab" aria-controls="ld2h-panel-{{index}}" data-tab-index="{{index}}"><span class="mdc-tab__content"><span class="mdc-tab__text-label">{{title}}</span></span></button>
{{/each}}</div></div></div></div>
{{#each ld2hTabs}}<div class="ld2h-tab-panel" id="ld2h-panel-{{index}}" role="tabpanel"{{#unless @first}} hidden{{/unless}}>
<div class="ld2h-card__content" style="padding: 16px;">{{{content}}}</div>
{{#if buttons}}<div class="mdc-card__actions"><div class="mdc-card__action-buttons">{{#each buttons}}{{> ld2hButton}}{{/each}}</div></div>
{{/if}}</div>
{{/each}}</div>"#;

pub const DEFAULT_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{name}}</h2><h3 class="mdc-typography--subtitle2" style="margin: 0;">{{description}}</h3>"#;

pub const RESERVATION_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{#if reservationFor.name}}{{reservationFor.name}}{{else}}{{ld2hType}}{{/if}}</h2>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{ld2hDate}} {{ld2hTime}}</h3>
{{#if reservationNumber}}<p class="mdc-typography--body2">#{{reservationNumber}}{{#if underName.name}} &middot; {{underName.name}}{{/if}}</p>{{/if}}"#;

pub const FLIGHT_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{reservationFor.airline.iataCode}} {{reservationFor.flightNumber}}</h2>
<h3 class="mdc-typography--subtitle1" style="margin: 0;">{{reservationFor.departureAirport.iataCode}} &rarr; {{reservationFor.arrivalAirport.iataCode}}</h3>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{ld2hDate}} {{ld2hTime}}</h3>
{{#if reservationNumber}}<p class="mdc-typography--body2">#{{reservationNumber}}{{#if underName.name}} &middot; {{underName.name}}{{/if}}</p>{{/if}}"#;

pub const TRAIN_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{reservationFor.departureStation.name}} &rarr; {{reservationFor.arrivalStation.name}}</h2>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{ld2hDate}} {{ld2hTime}}{{#if reservationFor.trainNumber}} &middot; {{reservationFor.trainNumber}}{{/if}}</h3>
{{#if reservedTicket.ticketedSeat.seatNumber}}<p class="mdc-typography--body2">{{reservedTicket.ticketedSeat.seatNumber}}</p>{{/if}}"#;

pub const EVENT_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{name}}</h2>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{startDate}}{{#if location.name}} &middot; {{location.name}}{{/if}}</h3>
{{#if description}}<p class="mdc-typography--body2" style="white-space: pre-line;">{{description}}</p>{{/if}}"#;

pub const RECIPE_SUB: &str = r#"<h2 class="mdc-typography--headline6" style="margin: 0;">{{name}}</h2>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{#if totalTime}}{{totalTime}}{{/if}}{{#if recipeYield}} &middot; {{recipeYield}}{{/if}}</h3>
{{#if description}}<p class="mdc-typography--body2">{{description}}</p>{{/if}}"#;

pub const EMAIL_MESSAGE_SUB: &str = r#"<h2 class="mdc-typography--headline5" style="margin: 0;">{{potentialAction.name}}</h2>
<h3 class="mdc-typography--subtitle2" style="margin: 0;">{{description}}</h3>"#;

/// Card templates by key.
pub const CARDS: &[(&str, &str)] = &[("default", DEFAULT_CARD), ("Reservations", RESERVATIONS_CARD)];

/// Subtemplates by key.
pub const SUBTEMPLATES: &[(&str, &str)] = &[
    ("default", DEFAULT_SUB),
    ("Reservation", RESERVATION_SUB),
    ("FlightReservation", FLIGHT_SUB),
    ("TrainReservation", TRAIN_SUB),
    ("Event", EVENT_SUB),
    ("Recipe", RECIPE_SUB),
    ("EmailMessage", EMAIL_MESSAGE_SUB),
];
